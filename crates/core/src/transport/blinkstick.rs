//! BlinkStick USB-HID LED controllers.
//!
//! LED data is written with HID SET_REPORT class requests on the control
//! endpoint. The device exposes one feature report per buffer size, so the
//! report is picked from the number of LEDs being written and the payload is
//! zero-padded to that size.

use std::time::Duration;

use log::{info, warn};
use rusb::{Context, DeviceHandle, Direction, Recipient, RequestType, UsbContext};

use super::{LedDataTransport, TransportError};

pub const BLINKSTICK_VENDOR_ID: u16 = 0x20A0;
pub const BLINKSTICK_PRODUCT_ID: u16 = 0x41E5;

/// HID class request SET_REPORT
const HID_SET_REPORT: u8 = 0x09;

const USB_TIMEOUT: Duration = Duration::from_millis(1000);

/// `(max LEDs, report id)` pairs, smallest first.
const LED_REPORTS: [(usize, u8); 4] = [(8, 6), (16, 7), (32, 8), (64, 9)];

/// Pick the smallest feature report that fits `led_count` LEDs.
///
/// Returns `(report_id, max_leds)`.
pub fn report_for_led_count(led_count: usize) -> Result<(u8, usize), TransportError> {
    LED_REPORTS
        .iter()
        .find(|(max_leds, _)| led_count <= *max_leds)
        .map(|&(max_leds, report_id)| (report_id, max_leds))
        .ok_or_else(|| {
            TransportError::Payload(format!(
                "BlinkStick supports at most 64 LEDs per channel, got {}",
                led_count
            ))
        })
}

/// Build `[report_id, channel, data..., padding]` for a run of LED bytes.
pub fn build_led_report(channel: u8, data: &[u8]) -> Result<(u8, Vec<u8>), TransportError> {
    let (report_id, max_leds) = report_for_led_count(data.len().div_ceil(3))?;

    let mut report = Vec::with_capacity(2 + max_leds * 3);
    report.push(report_id);
    report.push(channel);
    report.extend_from_slice(data);
    report.resize(2 + max_leds * 3, 0);
    Ok((report_id, report))
}

/// An opened BlinkStick.
pub struct BlinkStick {
    handle: DeviceHandle<Context>,
}

impl BlinkStick {
    /// Open the first BlinkStick on the bus.
    pub fn find_first() -> Result<Self, TransportError> {
        let context = Context::new()?;

        let device = context
            .devices()?
            .iter()
            .find(|d| {
                d.device_descriptor().map_or(false, |desc| {
                    desc.vendor_id() == BLINKSTICK_VENDOR_ID
                        && desc.product_id() == BLINKSTICK_PRODUCT_ID
                })
            })
            .ok_or_else(|| TransportError::DeviceNotFound("BlinkStick".to_string()))?;

        let handle = device.open()?;

        // usbhid grabs the device on Linux
        if handle.kernel_driver_active(0).unwrap_or(false) {
            if let Err(err) = handle.detach_kernel_driver(0) {
                warn!("Could not detach kernel driver from BlinkStick: {}", err);
            }
        }

        info!(
            "Opened BlinkStick on bus {} address {}",
            device.bus_number(),
            device.address()
        );

        Ok(Self { handle })
    }
}

impl LedDataTransport for BlinkStick {
    fn set_led_data(&mut self, channel: u8, data: &[u8]) -> Result<(), TransportError> {
        let (report_id, report) = build_led_report(channel, data)?;
        let request_type = rusb::request_type(Direction::Out, RequestType::Class, Recipient::Device);

        self.handle.write_control(
            request_type,
            HID_SET_REPORT,
            u16::from(report_id),
            0,
            &report,
            USB_TIMEOUT,
        )?;
        Ok(())
    }
}
