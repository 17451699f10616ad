//! The main loop's handle on the BLE link.
//!
//! The advertiser task owns the connection's lifetime and parks a clone
//! here while it is up; the main loop only ever notifies through it.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use nrf_softdevice::ble::Connection;

use super::Server;
use crate::hid::KeyboardReport;
use crate::io::Transport;

static LINK: Mutex<CriticalSectionRawMutex, RefCell<Option<Connection>>> =
    Mutex::new(RefCell::new(None));

pub(super) fn attach(conn: Connection) {
    LINK.lock(|link| *link.borrow_mut() = Some(conn));
}

pub(super) fn detach() {
    LINK.lock(|link| *link.borrow_mut() = None);
}

fn current() -> Option<Connection> {
    LINK.lock(|link| link.borrow().clone())
        .filter(|conn| conn.handle().is_some())
}

pub struct BleTransport {
    server: &'static Server,
}

impl BleTransport {
    pub fn new(server: &'static Server) -> Self {
        Self { server }
    }
}

impl Transport for BleTransport {
    fn is_connected(&self) -> bool {
        current().is_some()
    }

    fn send_report(&mut self, report: &KeyboardReport) {
        let Some(conn) = current() else {
            return;
        };
        if let Err(_e) = self.server.hid.input_report_notify(&conn, &report.to_bytes()) {
            warn!("BLE: report notify failed: {:?}", _e);
        }
    }

    fn set_battery_level(&mut self, percent: u8) {
        if let Err(_e) = self.server.bas.battery_level_set(&percent) {
            warn!("BLE: battery level rejected: {:?}", _e);
        }
        if let Some(conn) = current() {
            if let Err(_e) = self.server.bas.battery_level_notify(&conn, &percent) {
                debug!("BLE: battery notify failed: {:?}", _e);
            }
        }
    }
}
