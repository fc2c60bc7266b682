use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rusb::{Device, DeviceHandle, GlobalContext};
use std::thread;
use std::time::{Duration, Instant};

use crate::ihex::{Image, ERASED};

/// Teensy 2.0 HalfKay bootloader USB identifiers.
const HALFKAY_VID: u16 = 0x16C0;
const HALFKAY_PID: u16 = 0x0478;

/// ATmega32U4 flash page size in bytes.
const PAGE_SIZE: usize = 128;

/// Flash available to the application; HalfKay keeps the top 512 bytes.
const APP_FLASH: u32 = 32 * 1024 - 512;

/// Address that makes HalfKay leave the bootloader and run the application.
const BOOT_ADDRESS: u16 = 0xFFFF;

/// The first block triggers a chip erase and takes much longer to acknowledge.
const ERASE_TIMEOUT: Duration = Duration::from_secs(5);
const BLOCK_TIMEOUT: Duration = Duration::from_millis(500);

/// How often to look for the bootloader while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A Teensy sitting in its HalfKay bootloader.
pub struct Teensy {
    handle: DeviceHandle<GlobalContext>,
}

impl Teensy {
    /// Open the bootloader if one is attached.
    pub fn find() -> Result<Option<Teensy>> {
        let devices = rusb::devices().context("failed to enumerate USB devices")?;
        for device in devices.iter() {
            if is_halfkay(&device)? {
                let handle = device.open().context(
                    "failed to open Teensy bootloader (may need root/sudo or udev rules)",
                )?;
                return Ok(Some(Teensy { handle }));
            }
        }
        Ok(None)
    }

    /// Poll until someone presses the reset button, or `timeout` runs out.
    pub fn wait(timeout: Duration) -> Result<Teensy> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_message("Waiting for HalfKay bootloader (press the Teensy reset button)");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let started = Instant::now();
        loop {
            if let Some(teensy) = Teensy::find()? {
                spinner.finish_with_message("Bootloader found");
                return Ok(teensy);
            }
            if started.elapsed() >= timeout {
                spinner.abandon_with_message("Bootloader not found");
                bail!("no HalfKay bootloader after {:?}", timeout);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Write `image` page by page. Erased pages are skipped, except the
    /// first one, which HalfKay needs to start its chip erase.
    pub fn program(&self, image: &Image) -> Result<()> {
        if image.end() > APP_FLASH {
            bail!(
                "firmware too large: ends at 0x{:04X}, application flash ends at 0x{:04X}",
                image.end(),
                APP_FLASH
            );
        }

        let pages = image.pages(PAGE_SIZE);
        let progress = ProgressBar::new(pages.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} pages")?
                .progress_chars("=> "),
        );
        progress.set_message("Flashing");

        let mut first = true;
        for (address, page) in &pages {
            if !first && page.iter().all(|&b| b == ERASED) {
                debug!("skipping erased page 0x{:04X}", address);
                progress.inc(1);
                continue;
            }

            let timeout = if first { ERASE_TIMEOUT } else { BLOCK_TIMEOUT };
            self.write_block(*address as u16, page, timeout)
                .with_context(|| format!("failed to write page at address 0x{:04X}", address))?;
            first = false;
            progress.inc(1);
        }

        progress.finish_with_message("Flashed");
        Ok(())
    }

    /// Leave the bootloader and start the freshly written firmware.
    pub fn boot(self) {
        let blank = [0u8; PAGE_SIZE];
        // The device drops off the bus immediately, so the transfer usually reports an error
        if let Err(err) = self.write_block(BOOT_ADDRESS, &blank, BLOCK_TIMEOUT) {
            debug!("boot request: {}", err);
        }
        info!("Teensy rebooted into the application");
    }

    /// One HalfKay block: little-endian address followed by a full page,
    /// sent as a HID SET_REPORT control transfer.
    fn write_block(&self, address: u16, page: &[u8], timeout: Duration) -> Result<()> {
        let mut block = Vec::with_capacity(2 + PAGE_SIZE);
        block.extend_from_slice(&address.to_le_bytes());
        block.extend_from_slice(page);

        // bmRequestType 0x21: host-to-device, class, interface
        // bRequest 0x09: SET_REPORT, wValue 0x0200: output report 0
        self.handle
            .write_control(0x21, 0x09, 0x0200, 0, &block, timeout)
            .context("USB control transfer failed")?;
        Ok(())
    }
}

/// Check whether a Teensy in HalfKay bootloader mode is connected.
pub fn detect() -> Result<bool> {
    let devices = rusb::devices().context("failed to enumerate USB devices")?;
    for device in devices.iter() {
        if is_halfkay(&device)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn is_halfkay(device: &Device<GlobalContext>) -> Result<bool> {
    let desc = device
        .device_descriptor()
        .context("failed to read device descriptor")?;
    Ok(desc.vendor_id() == HALFKAY_VID && desc.product_id() == HALFKAY_PID)
}
