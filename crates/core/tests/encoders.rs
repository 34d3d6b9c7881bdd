//! Host-side tests for every output backend.
//!
//! Devices are replaced with mock transports that record what the encoders
//! hand them, so the wire layout can be checked without hardware.

use std::io;

use strand_core::output::{
    BitPackedBusEncoder, NetworkPacketEncoder, OutputBackend, OutputError, ProxyProtocolEncoder,
    SerialTripletEncoder, SpiFrameEncoder,
};
use strand_core::transport::{
    DatagramTransport, LedDataTransport, LedRow, PixelClient, RowStrip, SpidevStrip,
    TransportError, WordStrip,
};
use strand_core::PixelFrame;

// ============================================================================
// Mock transports
// ============================================================================

#[derive(Default)]
struct MockSocket {
    sent: Vec<Vec<u8>>,
    fail_next_send: bool,
}

impl DatagramTransport for MockSocket {
    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        if self.fail_next_send {
            self.fail_next_send = false;
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "port unreachable").into());
        }
        self.sent.push(payload.to_vec());
        Ok(())
    }
}

struct MockWordStrip {
    words: Vec<u32>,
    flushed: Vec<Vec<u32>>,
}

impl MockWordStrip {
    fn new(n_pixels: usize) -> Self {
        Self {
            words: vec![0; n_pixels],
            flushed: Vec::new(),
        }
    }
}

impl WordStrip for MockWordStrip {
    fn led_data_mut(&mut self) -> &mut [u32] {
        &mut self.words
    }

    fn show(&mut self) -> Result<(), TransportError> {
        self.flushed.push(self.words.clone());
        Ok(())
    }
}

struct MockRowStrip {
    rows: Vec<LedRow>,
    flushes: usize,
}

impl MockRowStrip {
    fn new(n_pixels: usize, header: u8) -> Self {
        Self {
            rows: vec![LedRow::with_header(header); n_pixels],
            flushes: 0,
        }
    }
}

impl RowStrip for MockRowStrip {
    fn rows(&self) -> &[LedRow] {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut [LedRow] {
        &mut self.rows
    }

    fn show(&mut self) -> Result<(), TransportError> {
        self.flushes += 1;
        Ok(())
    }
}

#[derive(Default)]
struct MockHid {
    writes: Vec<(u8, Vec<u8>)>,
}

impl LedDataTransport for MockHid {
    fn set_led_data(&mut self, channel: u8, data: &[u8]) -> Result<(), TransportError> {
        self.writes.push((channel, data.to_vec()));
        Ok(())
    }
}

#[derive(Default)]
struct MockProxy {
    calls: Vec<Vec<[u8; 3]>>,
}

impl PixelClient for MockProxy {
    fn put_pixels(&mut self, pixels: &[[u8; 3]]) -> Result<(), TransportError> {
        self.calls.push(pixels.to_vec());
        Ok(())
    }
}

fn hostile_frame() -> PixelFrame {
    PixelFrame::from_pixels(vec![
        [f32::NAN, -1.0, 1e9],
        [f32::INFINITY, f32::NEG_INFINITY, 255.5],
        [-0.0, 127.9, 256.0],
    ])
}

// ============================================================================
// Tests: NetworkPacketEncoder
// ============================================================================

#[test]
fn test_network_channel_major_frame() {
    let frame = PixelFrame::from_channels(&[300.0, -5.0, 10.0], &[0.0; 3], &[0.0; 3]).unwrap();

    let mut encoder = NetworkPacketEncoder::new(3, 255, MockSocket::default());
    encoder.show(&frame).unwrap();

    let sent = &encoder.transport().sent;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], vec![255, 0, 0, 0, 0, 0, 10, 0, 0]);
}

#[test]
fn test_network_clips_to_max_brightness_without_gamma() {
    let frame = PixelFrame::from_pixels(vec![[145.0, 192.0, 225.0]]);

    let mut encoder = NetworkPacketEncoder::new(1, 200, MockSocket::default());
    encoder.show(&frame).unwrap();

    assert_eq!(encoder.transport().sent[0], vec![145, 192, 200]);
}

#[test]
fn test_network_show_is_idempotent() {
    let frame = PixelFrame::from_pixels(vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);

    let mut encoder = NetworkPacketEncoder::new(2, 255, MockSocket::default());
    encoder.show(&frame).unwrap();
    encoder.show(&frame).unwrap();

    let sent = &encoder.transport().sent;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], sent[1]);
}

#[test]
fn test_network_send_failure_propagates() {
    let socket = MockSocket {
        fail_next_send: true,
        ..MockSocket::default()
    };
    let mut encoder = NetworkPacketEncoder::new(1, 255, socket);

    let result = encoder.show(&PixelFrame::new(1));
    assert!(matches!(
        result,
        Err(OutputError::Transport(TransportError::Io(_)))
    ));

    // nothing is retried, the next frame goes out normally
    encoder.show(&PixelFrame::new(1)).unwrap();
    assert_eq!(encoder.transport().sent.len(), 1);
}

// ============================================================================
// Tests: BitPackedBusEncoder
// ============================================================================

#[test]
fn test_bit_packed_gamma_then_pack() {
    let frame = PixelFrame::from_pixels(vec![[145.0, 192.0, 225.0], [0.0, 0.0, 0.0]]);

    let mut encoder = BitPackedBusEncoder::new(2, MockWordStrip::new(2)).unwrap();
    encoder.show(&frame).unwrap();

    let flushed = &encoder.strip().flushed;
    assert_eq!(flushed.len(), 1);
    assert_eq!(flushed[0], vec![9_523_911, 0]);
}

#[test]
fn test_bit_packed_rejects_wrong_buffer() {
    let result = BitPackedBusEncoder::new(4, MockWordStrip::new(3));
    assert!(matches!(
        result,
        Err(OutputError::FrameSizeMismatch {
            expected: 4,
            actual: 3
        })
    ));
}

// ============================================================================
// Tests: SpiFrameEncoder
// ============================================================================

#[test]
fn test_spi_preserves_header() {
    let mut encoder = SpiFrameEncoder::new(2, MockRowStrip::new(2, 0b1110_0101)).unwrap();

    let frame = PixelFrame::from_pixels(vec![[10.0, 20.0, 30.0], [255.0, 255.0, 255.0]]);
    encoder.show(&frame).unwrap();
    encoder.show(&frame).unwrap();

    let strip = encoder.strip();
    assert_eq!(strip.flushes, 2);
    assert_eq!(strip.rows()[0].to_bytes(), [0b1110_0101, 30, 20, 10]);
    assert_eq!(strip.rows()[1].to_bytes(), [0b1110_0101, 255, 255, 255]);
}

#[test]
fn test_spidev_wire_frame() {
    let strip = SpidevStrip::from_writer(Vec::new(), 2, 31);
    let mut encoder = SpiFrameEncoder::new(2, strip).unwrap();

    let frame = PixelFrame::from_pixels(vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    encoder.show(&frame).unwrap();

    assert_eq!(
        encoder.strip().device(),
        &vec![
            0, 0, 0, 0, // start frame
            0xFF, 3, 2, 1, //
            0xFF, 6, 5, 4, //
            0, // end frame
        ]
    );
}

// ============================================================================
// Tests: SerialTripletEncoder
// ============================================================================

#[test]
fn test_serial_triplet_grb_with_gamma() {
    let frame = PixelFrame::from_pixels(vec![[145.0, 192.0, 225.0], [100.0, 150.0, 200.0]]);

    let mut encoder = SerialTripletEncoder::new(2, MockHid::default());
    encoder.show(&frame).unwrap();

    let writes = &encoder.device().writes;
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0], (0, vec![145, 82, 199, 88, 39, 157]));
}

#[test]
fn test_serial_triplet_channel() {
    let mut encoder = SerialTripletEncoder::new(1, MockHid::default()).with_channel(2);
    encoder.show(&PixelFrame::new(1)).unwrap();

    assert_eq!(encoder.device().writes[0], (2, vec![0, 0, 0]));
}

// ============================================================================
// Tests: ProxyProtocolEncoder
// ============================================================================

#[test]
fn test_proxy_forwards_rgb_triples() {
    let frame = PixelFrame::from_pixels(vec![[145.0, 192.0, 225.0], [-4.0, 300.0, 7.6]]);

    let mut encoder = ProxyProtocolEncoder::new(2, MockProxy::default());
    encoder.show(&frame).unwrap();

    let calls = &encoder.client().calls;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], vec![[145, 192, 225], [0, 255, 7]]);
}

// ============================================================================
// Tests: shared behavior
// ============================================================================

#[test]
fn test_driver_unavailable_on_every_backend() {
    fn unavailable() -> TransportError {
        TransportError::DeviceNotFound("nothing plugged in".to_string())
    }

    let network = NetworkPacketEncoder::<MockSocket>::open(3, 255, || Err(unavailable()));
    assert!(matches!(
        network,
        Err(OutputError::DriverUnavailable {
            backend: "network",
            ..
        })
    ));

    let pwm = BitPackedBusEncoder::<MockWordStrip>::open(3, || Err(unavailable()));
    assert!(matches!(
        pwm,
        Err(OutputError::DriverUnavailable { backend: "pwm", .. })
    ));

    let spi = SpiFrameEncoder::<MockRowStrip>::open(3, || Err(unavailable()));
    assert!(matches!(
        spi,
        Err(OutputError::DriverUnavailable { backend: "spi", .. })
    ));

    let hid = SerialTripletEncoder::<MockHid>::open(3, || Err(unavailable()));
    assert!(matches!(
        hid,
        Err(OutputError::DriverUnavailable { backend: "hid", .. })
    ));

    let proxy = ProxyProtocolEncoder::<MockProxy>::open(3, || Err(unavailable()));
    assert!(matches!(
        proxy,
        Err(OutputError::DriverUnavailable {
            backend: "proxy",
            ..
        })
    ));
}

#[test]
fn test_open_with_acquired_transport() {
    let encoder = SerialTripletEncoder::open(5, || Ok(MockHid::default())).unwrap();
    assert_eq!(encoder.pixel_count(), 5);
    assert_eq!(encoder.name(), "hid");
}

#[test]
fn test_frame_size_mismatch_on_show() {
    let mut backends: Vec<Box<dyn OutputBackend>> = vec![
        Box::new(NetworkPacketEncoder::new(3, 255, MockSocket::default())),
        Box::new(BitPackedBusEncoder::new(3, MockWordStrip::new(3)).unwrap()),
        Box::new(SpiFrameEncoder::new(3, MockRowStrip::new(3, 0xFF)).unwrap()),
        Box::new(SerialTripletEncoder::new(3, MockHid::default())),
        Box::new(ProxyProtocolEncoder::new(3, MockProxy::default())),
    ];

    for backend in backends.iter_mut() {
        let result = backend.show(&PixelFrame::new(2));
        assert!(
            matches!(
                result,
                Err(OutputError::FrameSizeMismatch {
                    expected: 3,
                    actual: 2
                })
            ),
            "{} accepted a short frame",
            backend.name()
        );
    }
}

#[test]
fn test_hostile_values_stay_in_range() {
    let frame = hostile_frame();

    let mut network = NetworkPacketEncoder::new(3, 255, MockSocket::default());
    network.show(&frame).unwrap();
    assert_eq!(
        network.transport().sent[0],
        vec![0, 0, 255, 255, 0, 255, 0, 127, 255]
    );

    let mut pwm = BitPackedBusEncoder::new(3, MockWordStrip::new(3)).unwrap();
    pwm.show(&frame).unwrap();
    assert!(pwm.strip().flushed[0].iter().all(|word| *word <= 0x00FF_FFFF));

    let mut spi = SpiFrameEncoder::new(3, MockRowStrip::new(3, 0xE3)).unwrap();
    spi.show(&frame).unwrap();
    let rows: Vec<[u8; 4]> = spi.strip().rows().iter().map(|row| row.to_bytes()).collect();
    assert_eq!(
        rows,
        vec![[0xE3, 255, 0, 0], [0xE3, 255, 0, 255], [0xE3, 255, 127, 0]]
    );

    let mut hid = SerialTripletEncoder::new(3, MockHid::default());
    hid.show(&frame).unwrap();
    assert_eq!(
        hid.device().writes[0],
        (0, vec![0, 0, 255, 0, 255, 255, 63, 0, 255])
    );

    let mut proxy = ProxyProtocolEncoder::new(3, MockProxy::default());
    proxy.show(&frame).unwrap();
    assert_eq!(proxy.client().calls[0], vec![[0, 0, 255], [255, 0, 255], [0, 127, 255]]);
}
