//! BrooksSla -- the HART master session for an SLA-series flow controller.
//!
//! This module ties the frame codec and stream parser to a [`Transport`]
//! to produce a working driver. It owns the link-level discipline: one
//! exchange in flight at a time, stale-input flushing before each request,
//! a bounded response window, and tag-based address resolution.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use hartbus_core::error::{Error, Result};
use hartbus_core::transport::Transport;
use hartbus_protocol::frame::{Address, FrameType, HartFrame, LongAddress};
use hartbus_protocol::parser::StreamParser;
use hartbus_protocol::status::DeviceStatus;

use crate::commands::{self, Command};
use crate::units::{FlowRateUnit, FlowReference};

/// How long a pre-request flush waits on each drain read before deciding
/// the line is quiet.
const FLUSH_READ_TIMEOUT: Duration = Duration::from_millis(50);

/// A validated response frame with its status bytes split out.
///
/// Every ACK payload opens with the two status bytes; `data()` is the
/// payload with those stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct HartResponse {
    frame: HartFrame,
    status: DeviceStatus,
    data: Vec<u8>,
}

impl HartResponse {
    fn from_frame(frame: HartFrame) -> Result<HartResponse> {
        let payload = frame.data();
        if payload.len() < 2 {
            return Err(Error::Protocol(format!(
                "response to command {} is missing status bytes ({} byte payload)",
                frame.command(),
                payload.len()
            )));
        }
        let status = DeviceStatus::from_bytes(payload[0], payload[1]);
        let data = payload[2..].to_vec();
        Ok(HartResponse {
            frame,
            status,
            data,
        })
    }

    /// The command opcode echoed by the device.
    pub fn command(&self) -> u8 {
        self.frame.command()
    }

    /// The raw address bytes of the response frame.
    pub fn address(&self) -> &[u8] {
        self.frame.address()
    }

    /// The wire byte count of the response payload, status bytes included.
    pub fn byte_count(&self) -> u8 {
        self.frame.byte_count()
    }

    /// The decoded status bytes.
    pub fn status(&self) -> DeviceStatus {
        self.status
    }

    /// Command-specific reply data, status bytes stripped.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A flow reading from the primary variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowReading {
    pub reading: f32,
    pub units: FlowRateUnit,
}

/// Confirmation of a setpoint write: the instrument reports the new
/// setpoint both as percent-of-range and in the selected units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSetting {
    pub percent: f32,
    pub units: FlowRateUnit,
    pub value: f32,
}

/// A full-scale flow range for one gas calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowRange {
    pub units: FlowRateUnit,
    pub value: f32,
}

/// Session state guarded by the link lock: the transport plus everything
/// a command exchange reads or writes.
struct LinkState {
    transport: Box<dyn Transport>,
    /// Resolved long address; `None` until [`BrooksSla::resolve_address`]
    /// succeeds, during which commands go out unaddressed.
    address: Option<LongAddress>,
    /// Last flow unit the device confirmed via command 196.
    flow_units: Option<FlowRateUnit>,
}

/// A connected Brooks SLA flow controller driven over HART.
///
/// Constructed via [`SlaBuilder`](crate::builder::SlaBuilder). All device
/// communication goes through the [`Transport`] provided at build time,
/// serialized by a link-wide lock: at most one exchange is in flight, and
/// concurrent callers queue in acquisition order.
pub struct BrooksSla {
    tag: String,
    link: Mutex<LinkState>,
    response_timeout: Duration,
    preamble_chars: usize,
}

impl std::fmt::Debug for BrooksSla {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrooksSla")
            .field("tag", &self.tag)
            .field("response_timeout", &self.response_timeout)
            .field("preamble_chars", &self.preamble_chars)
            .finish_non_exhaustive()
    }
}

impl BrooksSla {
    /// Called by [`SlaBuilder`](crate::builder::SlaBuilder); use the
    /// builder API instead.
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        tag: String,
        response_timeout: Duration,
        preamble_chars: usize,
    ) -> Self {
        BrooksSla {
            tag,
            link: Mutex::new(LinkState {
                transport,
                address: None,
                flow_units: None,
            }),
            response_timeout,
            preamble_chars,
        }
    }

    /// The device tag this session was built for.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The long address resolved for this session, if any.
    pub async fn address(&self) -> Option<LongAddress> {
        self.link.lock().await.address
    }

    /// The flow unit last confirmed by the device, if any.
    pub async fn flow_units(&self) -> Option<FlowRateUnit> {
        self.link.lock().await.flow_units
    }

    /// Close the underlying transport.
    ///
    /// Best effort: a failure to close cleanly is logged and swallowed,
    /// since the logical session is over regardless.
    pub async fn close(&self) -> Result<()> {
        let mut link = self.link.lock().await;
        if let Err(e) = link.transport.close().await {
            warn!(tag = %self.tag, error = %e, "Failed to close transport cleanly");
        }
        Ok(())
    }

    /// Frame a command to this session's address (or unaddressed, if no
    /// address has been resolved yet) and return the wire bytes.
    fn frame_request(
        &self,
        address: Option<LongAddress>,
        command: Command,
        data: Vec<u8>,
    ) -> Result<Vec<u8>> {
        let addr = match address {
            Some(addr) => addr,
            // Universal unaddressed form: all-zero long address.
            None => LongAddress::new(0, 0, 0)?,
        };
        let frame = HartFrame::new(
            FrameType::LongStx,
            &Address::from(addr),
            command.opcode(),
            data,
        )?;
        frame.encode(self.preamble_chars)
    }

    /// Drain stale unread bytes so the next response is never matched
    /// against a prior, abandoned exchange.
    async fn flush_input(link: &mut LinkState) -> Result<()> {
        let mut buf = [0u8; 1024];
        loop {
            match link.transport.receive(&mut buf, FLUSH_READ_TIMEOUT).await {
                Ok(0) => return Ok(()),
                Ok(n) => {
                    debug!(bytes = n, "Discarded stale input");
                }
                Err(Error::NoResponse) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    /// Run one request/response exchange with the link lock already held.
    ///
    /// The response deadline is measured from the start of the read phase;
    /// time spent queued for the lock does not count. No retries: a silent
    /// device fails with [`Error::NoResponse`] and retrying is the
    /// caller's policy.
    async fn transaction_locked(
        &self,
        link: &mut LinkState,
        request: &[u8],
    ) -> Result<HartResponse> {
        Self::flush_input(link).await?;
        link.transport.send(request).await?;

        // Fresh parser per exchange; leftover bytes from a timed-out
        // exchange must never stitch into this frame.
        let mut parser = StreamParser::new();
        let deadline = Instant::now() + self.response_timeout;
        let mut buf = [0u8; 512];

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(Error::NoResponse);
            }
            let n = match link.transport.receive(&mut buf, deadline - now).await {
                Ok(0) => return Err(Error::ConnectionLost),
                Ok(n) => n,
                Err(Error::NoResponse) => return Err(Error::NoResponse),
                Err(e) => return Err(e),
            };
            if let Some(frame) = parser.feed(&buf[..n])? {
                debug!(
                    command = frame.command(),
                    byte_count = frame.byte_count(),
                    "Received response frame"
                );
                return HartResponse::from_frame(frame);
            }
        }
    }

    /// Run one raw request/response exchange.
    ///
    /// `request` must be a fully framed packet (see the command helpers
    /// for the usual entry points). Exchanges are serialized FIFO by the
    /// link lock.
    pub async fn transaction(&self, request: &[u8]) -> Result<HartResponse> {
        let mut link = self.link.lock().await;
        self.transaction_locked(&mut link, request).await
    }

    /// Resolve the device's long address from its tag (command 11) and
    /// adopt it for all subsequent commands. Returns the 24-bit device
    /// identification number.
    ///
    /// The resolution request itself goes out unaddressed, so it must be
    /// the only device with this tag on the segment.
    pub async fn resolve_address(&self) -> Result<u32> {
        let request = self.frame_request(
            None,
            Command::ReadUniqueIdentifierAssociatedWithTag,
            commands::tag_payload(&self.tag),
        )?;

        let mut link = self.link.lock().await;
        let response = self.transaction_locked(&mut link, &request).await?;
        let (mfg_id, device_type, id) = commands::parse_unique_identifier_reply(response.data())?;
        let address = LongAddress::new(mfg_id, device_type, id)?;
        debug!(
            tag = %self.tag,
            mfg_id,
            device_type,
            id,
            "Resolved device address"
        );
        link.address = Some(address);
        Ok(id)
    }

    /// Read the current flow (primary variable, command 1).
    pub async fn read_flow(&self) -> Result<FlowReading> {
        let mut link = self.link.lock().await;
        let request =
            self.frame_request(link.address, Command::ReadPrimaryVariable, Vec::new())?;
        let response = self.transaction_locked(&mut link, &request).await?;
        let (code, value) = commands::parse_unit_value(response.data())?;
        Ok(FlowReading {
            units: FlowRateUnit::from_code(code)?,
            reading: value,
        })
    }

    /// Select the flow unit, then write a setpoint in that unit
    /// (commands 196 and 236, run back-to-back under one lock hold).
    pub async fn set_flow(&self, units: FlowRateUnit, flow: f32) -> Result<FlowSetting> {
        let mut link = self.link.lock().await;
        self.select_units_locked(&mut link, units, FlowReference::Calibration)
            .await?;

        // Unit code 250 ("not used") means: interpret in the selected unit.
        let payload = commands::unit_value_payload(FlowRateUnit::NotUsed.code(), flow);
        let request = self.frame_request(
            link.address,
            Command::WriteSetpointPercentOrSelectedUnits,
            payload,
        )?;
        let response = self.transaction_locked(&mut link, &request).await?;
        let reply = commands::parse_setpoint_reply(response.data())?;
        Ok(FlowSetting {
            percent: reply.percent,
            units: FlowRateUnit::from_code(reply.unit_code)?,
            value: reply.value,
        })
    }

    /// Write a setpoint as percent of full scale (command 236).
    ///
    /// `flow` must be within `0.0..=100.0`; out-of-range values fail
    /// before any bytes are written to the transport.
    pub async fn set_flow_percent(&self, flow: f32) -> Result<FlowSetting> {
        if !(0.0..=100.0).contains(&flow) {
            return Err(Error::InvalidParameter(format!(
                "flow percent {flow} outside 0.0..=100.0"
            )));
        }

        let mut link = self.link.lock().await;
        let payload = commands::unit_value_payload(FlowRateUnit::Percent.code(), flow);
        let request = self.frame_request(
            link.address,
            Command::WriteSetpointPercentOrSelectedUnits,
            payload,
        )?;
        let response = self.transaction_locked(&mut link, &request).await?;
        let reply = commands::parse_setpoint_reply(response.data())?;
        Ok(FlowSetting {
            percent: reply.percent,
            units: FlowRateUnit::from_code(reply.unit_code)?,
            value: reply.value,
        })
    }

    async fn select_units_locked(
        &self,
        link: &mut LinkState,
        units: FlowRateUnit,
        reference: FlowReference,
    ) -> Result<FlowRateUnit> {
        let request = self.frame_request(
            link.address,
            Command::SelectFlowUnit,
            commands::select_units_payload(reference, units),
        )?;
        let response = self.transaction_locked(link, &request).await?;
        let (_, unit_code) = commands::parse_select_units_reply(response.data())?;
        let confirmed = FlowRateUnit::from_code(unit_code)?;
        link.flow_units = Some(confirmed);
        Ok(confirmed)
    }

    /// Select the flow unit the device reports and accepts setpoints in
    /// (command 196). Returns the unit the device confirmed.
    pub async fn select_units(
        &self,
        units: FlowRateUnit,
        reference: FlowReference,
    ) -> Result<FlowRateUnit> {
        let mut link = self.link.lock().await;
        self.select_units_locked(&mut link, units, reference).await
    }

    /// Perform a master reset (command 42).
    pub async fn master_reset(&self) -> Result<()> {
        let mut link = self.link.lock().await;
        let request =
            self.frame_request(link.address, Command::PerformMasterReset, Vec::new())?;
        self.transaction_locked(&mut link, &request).await?;
        Ok(())
    }

    /// Read the full-scale flow range for a gas calibration slot
    /// (command 152). `gas` selects calibration 0..=6.
    pub async fn read_flow_range(&self, gas: u8) -> Result<FlowRange> {
        if gas > 6 {
            return Err(Error::InvalidParameter(format!(
                "gas calibration {gas} outside 0..=6"
            )));
        }

        let mut link = self.link.lock().await;
        let request =
            self.frame_request(link.address, Command::ReadFullScaleFlowRange, vec![gas])?;
        let response = self.transaction_locked(&mut link, &request).await?;
        let (code, value) = commands::parse_unit_value(response.data())?;
        Ok(FlowRange {
            units: FlowRateUnit::from_code(code)?,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SlaBuilder;
    use hartbus_protocol::frame::checksum;
    use hartbus_test_harness::MockTransport;

    /// Build the wire bytes for an ACK reply: status bytes then data.
    fn ack_reply(address: &[u8; 5], command: u8, status: [u8; 2], data: &[u8]) -> Vec<u8> {
        let mut body = vec![FrameType::LongAck as u8];
        body.extend_from_slice(address);
        body.push(command);
        body.push((data.len() + 2) as u8);
        body.extend_from_slice(&status);
        body.extend_from_slice(data);
        let mut pkt = vec![0xFF; 5];
        pkt.extend_from_slice(&body);
        pkt.push(checksum(&body));
        pkt
    }

    /// The request bytes the session sends: unaddressed long STX frame.
    fn request(address: Option<LongAddress>, command: Command, data: Vec<u8>) -> Vec<u8> {
        let addr = address.unwrap_or_else(|| LongAddress::new(0, 0, 0).unwrap());
        HartFrame::new(FrameType::LongStx, &Address::from(addr), command.opcode(), data)
            .unwrap()
            .encode(5)
            .unwrap()
    }

    const UNADDRESSED: [u8; 5] = [0x80, 0x00, 0x00, 0x00, 0x00];

    async fn session(mock: MockTransport) -> BrooksSla {
        SlaBuilder::new("MFC-01")
            .build_with_transport(Box::new(mock))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn read_flow_parses_unit_and_value() {
        let mut mock = MockTransport::new();
        let mut data = vec![FlowRateUnit::LitersPerMin.code()];
        data.extend_from_slice(&1.5f32.to_be_bytes());
        mock.expect(
            &request(None, Command::ReadPrimaryVariable, Vec::new()),
            &ack_reply(&UNADDRESSED, 1, [0x00, 0x00], &data),
        );

        let sla = session(mock).await;
        let reading = sla.read_flow().await.unwrap();
        assert_eq!(reading.units, FlowRateUnit::LitersPerMin);
        assert_eq!(reading.reading, 1.5);
    }

    #[tokio::test]
    async fn set_flow_percent_validates_before_io() {
        let sla = session(MockTransport::new()).await;

        for bad in [-0.1f32, 100.1] {
            let err = sla.set_flow_percent(bad).await.unwrap_err();
            assert!(matches!(err, Error::InvalidParameter(_)), "{bad}");
        }
        // Validation failed before any bytes hit the transport, so the
        // empty expectation queue was never consulted.
    }

    #[tokio::test]
    async fn set_flow_percent_round_trip() {
        let mut mock = MockTransport::new();
        let payload = commands::unit_value_payload(57, 50.0);

        let mut reply = vec![57];
        reply.extend_from_slice(&50.0f32.to_be_bytes());
        reply.push(FlowRateUnit::LitersPerMin.code());
        reply.extend_from_slice(&0.75f32.to_be_bytes());

        mock.expect(
            &request(None, Command::WriteSetpointPercentOrSelectedUnits, payload),
            &ack_reply(&UNADDRESSED, 236, [0x00, 0x00], &reply),
        );

        let sla = session(mock).await;
        let setting = sla.set_flow_percent(50.0).await.unwrap();
        assert_eq!(setting.percent, 50.0);
        assert_eq!(setting.units, FlowRateUnit::LitersPerMin);
        assert_eq!(setting.value, 0.75);
    }

    #[tokio::test]
    async fn set_flow_selects_units_then_writes() {
        let mut mock = MockTransport::new();

        // First exchange: select L/min against the calibration reference.
        mock.expect(
            &request(None, Command::SelectFlowUnit, vec![2, 17]),
            &ack_reply(&UNADDRESSED, 196, [0x00, 0x00], &[2, 17]),
        );

        // Second exchange: setpoint in the selected unit (code 250).
        let payload = commands::unit_value_payload(250, 1.25);
        let mut reply = vec![57];
        reply.extend_from_slice(&62.5f32.to_be_bytes());
        reply.push(17);
        reply.extend_from_slice(&1.25f32.to_be_bytes());
        mock.expect(
            &request(None, Command::WriteSetpointPercentOrSelectedUnits, payload),
            &ack_reply(&UNADDRESSED, 236, [0x00, 0x00], &reply),
        );

        let sla = session(mock).await;
        let setting = sla
            .set_flow(FlowRateUnit::LitersPerMin, 1.25)
            .await
            .unwrap();
        assert_eq!(setting.percent, 62.5);
        assert_eq!(setting.units, FlowRateUnit::LitersPerMin);
        assert_eq!(setting.value, 1.25);
        assert_eq!(sla.flow_units().await, Some(FlowRateUnit::LitersPerMin));
    }

    #[tokio::test]
    async fn resolve_address_then_commands_use_it() {
        let mut mock = MockTransport::new();

        // Command 11 reply: expansion byte, mfg id, device type, then the
        // device id at offset 9.
        let mut ident = vec![0u8; 12];
        ident[0] = 0xFE;
        ident[1] = 0x0A;
        ident[2] = 0x64;
        ident[9] = 0x00;
        ident[10] = 0x00;
        ident[11] = 0x2A;
        mock.expect(
            &request(
                None,
                Command::ReadUniqueIdentifierAssociatedWithTag,
                commands::tag_payload("MFC-01"),
            ),
            &ack_reply(&UNADDRESSED, 11, [0x00, 0x00], &ident),
        );

        // Subsequent read goes to the resolved address.
        let resolved = LongAddress::new(0x0A, 0x64, 0x2A).unwrap();
        let mut data = vec![FlowRateUnit::LitersPerMin.code()];
        data.extend_from_slice(&2.0f32.to_be_bytes());
        mock.expect(
            &request(Some(resolved), Command::ReadPrimaryVariable, Vec::new()),
            &ack_reply(&resolved.to_bytes(), 1, [0x00, 0x00], &data),
        );

        let sla = session(mock).await;
        let id = sla.resolve_address().await.unwrap();
        assert_eq!(id, 0x2A);
        assert_eq!(sla.address().await, Some(resolved));

        let reading = sla.read_flow().await.unwrap();
        assert_eq!(reading.reading, 2.0);
    }

    #[tokio::test]
    async fn master_reset_sends_command_42() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(None, Command::PerformMasterReset, Vec::new()),
            &ack_reply(&UNADDRESSED, 42, [0x00, 0x00], &[]),
        );

        let sla = session(mock).await;
        sla.master_reset().await.unwrap();
    }

    #[tokio::test]
    async fn read_flow_range_validates_gas() {
        let sla = session(MockTransport::new()).await;
        let err = sla.read_flow_range(7).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn read_flow_range_round_trip() {
        let mut mock = MockTransport::new();
        let mut data = vec![FlowRateUnit::LitersPerMin.code()];
        data.extend_from_slice(&10.0f32.to_be_bytes());
        mock.expect(
            &request(None, Command::ReadFullScaleFlowRange, vec![1]),
            &ack_reply(&UNADDRESSED, 152, [0x00, 0x00], &data),
        );

        let sla = session(mock).await;
        let range = sla.read_flow_range(1).await.unwrap();
        assert_eq!(range.units, FlowRateUnit::LitersPerMin);
        assert_eq!(range.value, 10.0);
    }

    #[tokio::test]
    async fn silent_device_is_no_response() {
        let mut mock = MockTransport::new();
        mock.expect_silence(&request(None, Command::ReadPrimaryVariable, Vec::new()));

        let sla = session(mock).await;
        let err = sla.read_flow().await.unwrap_err();
        assert!(matches!(err, Error::NoResponse));
    }

    #[tokio::test]
    async fn status_bytes_are_surfaced() {
        let mut mock = MockTransport::new();
        let req = request(None, Command::ReadPrimaryVariable, Vec::new());
        let mut data = vec![FlowRateUnit::LitersPerMin.code()];
        data.extend_from_slice(&1.0f32.to_be_bytes());
        // Command status 0x06: configuration changed.
        mock.expect(&req, &ack_reply(&UNADDRESSED, 1, [0x00, 0x06], &data));

        let sla = session(mock).await;
        let response = sla.transaction(&req).await.unwrap();
        assert!(!response.status().comms.has_error());
        assert!(response.status().command.configuration_changed);
        assert_eq!(response.command(), 1);
        assert_eq!(response.byte_count(), 7);
        assert_eq!(response.data(), &data[..]);
    }

    #[tokio::test]
    async fn response_missing_status_bytes_is_protocol_error() {
        let mut mock = MockTransport::new();
        let req = request(None, Command::ReadPrimaryVariable, Vec::new());

        // A reply with a 1-byte payload cannot carry both status bytes.
        let body = [FrameType::LongAck as u8, 0x80, 0, 0, 0, 0, 1, 1, 0xAA];
        let mut pkt = vec![0xFF; 5];
        pkt.extend_from_slice(&body);
        pkt.push(checksum(&body));
        mock.expect(&req, &pkt);

        let sla = session(mock).await;
        let err = sla.transaction(&req).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn corrupt_response_is_a_violation() {
        let mut mock = MockTransport::new();
        let req = request(None, Command::ReadPrimaryVariable, Vec::new());
        let mut reply = ack_reply(&UNADDRESSED, 1, [0x00, 0x00], &[17, 0, 0, 0, 0]);
        let last = reply.len() - 1;
        reply[last] ^= 0xFF;
        mock.expect(&req, &reply);

        let sla = session(mock).await;
        let err = sla.read_flow().await.unwrap_err();
        assert!(matches!(err, Error::Violation(_)));
    }

    #[tokio::test]
    async fn fragmented_response_still_parses() {
        let mut mock = MockTransport::new();
        let mut data = vec![FlowRateUnit::LitersPerMin.code()];
        data.extend_from_slice(&1.5f32.to_be_bytes());
        mock.expect(
            &request(None, Command::ReadPrimaryVariable, Vec::new()),
            &ack_reply(&UNADDRESSED, 1, [0x00, 0x00], &data),
        );
        // Dribble the reply in 3-byte reads.
        mock.set_max_read(3);

        let sla = session(mock).await;
        let reading = sla.read_flow().await.unwrap();
        assert_eq!(reading.reading, 1.5);
    }

    #[tokio::test]
    async fn close_is_idempotent_and_best_effort() {
        let sla = session(MockTransport::new()).await;
        sla.close().await.unwrap();
        sla.close().await.unwrap();
    }

    #[tokio::test]
    async fn commands_after_close_are_not_connected() {
        let sla = session(MockTransport::new()).await;
        sla.close().await.unwrap();

        let err = sla.read_flow().await.unwrap_err();
        assert!(matches!(err, Error::NotConnected));
    }
}
