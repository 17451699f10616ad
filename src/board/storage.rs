//! Persistent storage for the active preset index.
//!
//! Uses the nRF52840's internal flash via the `sequential-storage` crate,
//! which handles wear levelling and page GC. One key-value item holds the
//! index; the range is the two pages reserved in `config`.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;

use crate::config::{STORAGE_FLASH_PAGE_COUNT, STORAGE_FLASH_PAGE_START};
use crate::error::Error;

/// Flash page size for nRF52840 (4 KB).
const FLASH_PAGE_SIZE: u32 = 4096;

/// Start address of our storage region.
const STORAGE_START: u32 = STORAGE_FLASH_PAGE_START * FLASH_PAGE_SIZE;

/// End address (exclusive) of our storage region.
const STORAGE_END: u32 = (STORAGE_FLASH_PAGE_START + STORAGE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;

/// Key of the active preset index in the map.
const KEY_ACTIVE_PRESET: u8 = 0x01;

/// Scratch buffer for one map item.
const ITEM_BUFFER_SIZE: usize = 32;

/// Serialises flash access between the main loop and anything else that
/// may touch the region later.
static FLASH_LOCK: Mutex<CriticalSectionRawMutex, ()> = Mutex::new(());

/// Read the stored preset index. `None` when nothing was ever stored or
/// the read failed; the caller falls back to the first preset.
pub async fn load_preset(flash: &mut impl NorFlash) -> Option<u8> {
    let _guard = FLASH_LOCK.lock().await;
    let mut buf = [0u8; ITEM_BUFFER_SIZE];

    match sequential_storage::map::fetch_item::<u8, u8, _>(
        flash,
        STORAGE_START..STORAGE_END,
        &mut NoCache::new(),
        &mut buf,
        &KEY_ACTIVE_PRESET,
    )
    .await
    {
        Ok(Some(index)) => {
            info!("Storage: preset {=u8} loaded", index);
            Some(index)
        }
        Ok(None) => {
            info!("Storage: no preset stored");
            None
        }
        Err(_e) => {
            warn!("Storage: read failed: {:?}", defmt::Debug2Format(&_e));
            None
        }
    }
}

/// Persist the preset index confirmed on the config screen.
pub async fn store_preset(flash: &mut impl NorFlash, index: u8) -> Result<(), Error> {
    let _guard = FLASH_LOCK.lock().await;
    let mut buf = [0u8; ITEM_BUFFER_SIZE];

    sequential_storage::map::store_item::<u8, u8, _>(
        flash,
        STORAGE_START..STORAGE_END,
        &mut NoCache::new(),
        &mut buf,
        &KEY_ACTIVE_PRESET,
        &index,
    )
    .await
    .map_err(|_e| {
        warn!("Storage: write failed: {:?}", defmt::Debug2Format(&_e));
        Error::Storage
    })?;

    info!("Storage: preset {=u8} saved", index);
    Ok(())
}
