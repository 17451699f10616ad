//! GATT server: HID-over-GATT keyboard and Battery Service.
//!
//! The `#[nrf_softdevice::gatt_service]` macros generate get/set/notify
//! helpers for every characteristic listed below.

use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::advertisement_builder::{
    AdvertisementDataType, Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload,
    ServiceList, ServiceUuid16,
};
use nrf_softdevice::ble::{gatt_server, peripheral};
use nrf_softdevice::Softdevice;

use super::transport;
use crate::config::{BLE_DEVICE_NAME, BLE_INITIAL_BATTERY_LEVEL};
use crate::error::Error;
use crate::hid::KEYBOARD_REPORT_MAP;

/// bcdHID 1.11, no country code, normally connectable.
const HID_INFO: [u8; 4] = [0x11, 0x01, 0x00, 0x02];

/// Report protocol (the boot layout is identical).
const PROTOCOL_MODE_REPORT: u8 = 0x01;

/// GAP appearance: HID keyboard.
const APPEARANCE_KEYBOARD: [u8; 2] = [0xC1, 0x03];

static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .services_16(
        ServiceList::Incomplete,
        &[ServiceUuid16::HUMAN_INTERFACE_DEVICE, ServiceUuid16::BATTERY],
    )
    .raw(AdvertisementDataType::APPEARANCE, &APPEARANCE_KEYBOARD)
    .full_name(BLE_DEVICE_NAME)
    .build();

static SCAN_DATA: [u8; 0] = [];

#[nrf_softdevice::gatt_service(uuid = "180f")]
pub struct BatteryService {
    #[characteristic(uuid = "2a19", read, notify)]
    pub battery_level: u8,
}

#[nrf_softdevice::gatt_service(uuid = "1812")]
pub struct HidService {
    /// HID Information.
    #[characteristic(uuid = "2a4a", read)]
    pub hid_info: [u8; 4],

    /// Report Map - the keyboard report descriptor.
    #[characteristic(uuid = "2a4b", read)]
    pub report_map: [u8; 64],

    /// HID Control Point - suspend / exit suspend.
    #[characteristic(uuid = "2a4c", write_without_response)]
    pub control_point: u8,

    /// Protocol Mode - 0 = Boot Protocol, 1 = Report Protocol.
    #[characteristic(uuid = "2a4e", read, write_without_response)]
    pub protocol_mode: u8,

    /// Input Report - one 8-byte keyboard report per notification.
    #[characteristic(uuid = "2a4d", read, notify)]
    pub input_report: [u8; 8],
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub bas: BatteryService,
    pub hid: HidService,
}

impl Server {
    /// Register both services and load their static values.
    pub fn start(sd: &mut Softdevice) -> Result<Self, Error> {
        let server = Self::new(sd).map_err(|_e| {
            warn!("BLE: GATT registration failed: {:?}", _e);
            Error::Transport
        })?;
        server
            .hid
            .hid_info_set(&HID_INFO)
            .and_then(|()| server.hid.report_map_set(&KEYBOARD_REPORT_MAP))
            .and_then(|()| server.hid.protocol_mode_set(&PROTOCOL_MODE_REPORT))
            .and_then(|()| server.bas.battery_level_set(&BLE_INITIAL_BATTERY_LEVEL))
            .map_err(|_e| {
                warn!("BLE: initial GATT values rejected: {:?}", _e);
                Error::Transport
            })?;
        Ok(server)
    }
}

/// Advertise, serve one central until it leaves, repeat.
#[embassy_executor::task]
pub async fn peripheral_task(sd: &'static Softdevice, server: &'static Server) -> ! {
    info!("BLE: advertising as {=str}", BLE_DEVICE_NAME);
    loop {
        let config = peripheral::Config::default();
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &ADV_DATA,
            scan_data: &SCAN_DATA,
        };
        let conn = match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => conn,
            Err(_e) => {
                warn!("BLE: advertising failed: {:?}", _e);
                Timer::after(Duration::from_secs(1)).await;
                continue;
            }
        };

        info!("BLE: central connected");
        transport::attach(conn.clone());

        let _reason = gatt_server::run(&conn, server, |event| match event {
            ServerEvent::Bas(BatteryServiceEvent::BatteryLevelCccdWrite { notifications }) => {
                debug!("BLE: battery notifications {=bool}", notifications);
            }
            ServerEvent::Hid(HidServiceEvent::InputReportCccdWrite { notifications }) => {
                debug!("BLE: report notifications {=bool}", notifications);
            }
            ServerEvent::Hid(HidServiceEvent::ControlPointWrite(_value)) => {
                debug!("BLE: control point {=u8}", _value);
            }
            ServerEvent::Hid(HidServiceEvent::ProtocolModeWrite(_mode)) => {
                debug!("BLE: protocol mode {=u8}", _mode);
            }
        })
        .await;

        transport::detach();
        info!("BLE: central disconnected: {:?}", _reason);
    }
}
