#[cfg(test)]
mod reception_report_test;

use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;
use util::bits::{read_i24, write_i24};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;

type Result<T> = std::result::Result<T, util::Error>;

pub(crate) const RECEPTION_REPORT_LENGTH: usize = 24;
pub(crate) const FRACTION_LOST_OFFSET: usize = 4;
pub(crate) const TOTAL_LOST_OFFSET: usize = 5;
pub(crate) const LAST_SEQ_OFFSET: usize = 8;
pub(crate) const JITTER_OFFSET: usize = 12;
pub(crate) const LAST_SR_OFFSET: usize = 16;
pub(crate) const DELAY_OFFSET: usize = 20;

const TOTAL_LOST_MAX: i32 = (1 << 23) - 1;
const TOTAL_LOST_MIN: i32 = -(1 << 23);

/// A ReceptionReport block conveys statistics on the reception of RTP packets
/// from a single synchronization source.
///
/// Every field has a fixed width, so setters always write straight into the
/// block and it never needs re-serialization on its own. A packet holding the
/// block still does, see `ReceiverReport::reports_mut`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ReceptionReport {
    view: BytesMut,
}

impl Default for ReceptionReport {
    fn default() -> Self {
        ReceptionReport {
            view: BytesMut::zeroed(RECEPTION_REPORT_LENGTH),
        }
    }
}

impl fmt::Display for ReceptionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.dump())
    }
}

impl ReceptionReport {
    pub fn new() -> Self {
        ReceptionReport::default()
    }

    /// The SSRC identifier of the source to which the information in this
    /// reception report block pertains.
    pub fn ssrc(&self) -> u32 {
        (&self.view[..]).get_u32()
    }

    pub fn set_ssrc(&mut self, ssrc: u32) {
        (&mut self.view[..]).put_u32(ssrc);
    }

    /// The fraction of RTP data packets from source SSRC lost since the
    /// previous SR or RR packet was sent, expressed as a fixed point
    /// number with the binary point at the left edge of the field.
    pub fn fraction_lost(&self) -> u8 {
        self.view[FRACTION_LOST_OFFSET]
    }

    pub fn set_fraction_lost(&mut self, fraction_lost: u8) {
        self.view[FRACTION_LOST_OFFSET] = fraction_lost;
    }

    /// The total number of RTP data packets from source SSRC that have
    /// been lost since the beginning of reception. Duplicates can make it
    /// negative.
    pub fn total_lost(&self) -> i32 {
        read_i24(&self.view, TOTAL_LOST_OFFSET)
    }

    /// Values outside the signed 24-bit range are clamped.
    pub fn set_total_lost(&mut self, total_lost: i32) {
        let total_lost = total_lost.clamp(TOTAL_LOST_MIN, TOTAL_LOST_MAX);
        write_i24(&mut self.view, TOTAL_LOST_OFFSET, total_lost);
    }

    /// The least significant 16 bits contain the highest sequence number received
    /// in an RTP data packet from source SSRC, and the most significant 16 bits extend
    /// that sequence number with the corresponding count of sequence number cycles.
    pub fn last_sequence_number(&self) -> u32 {
        (&self.view[LAST_SEQ_OFFSET..]).get_u32()
    }

    pub fn set_last_sequence_number(&mut self, last_sequence_number: u32) {
        (&mut self.view[LAST_SEQ_OFFSET..]).put_u32(last_sequence_number);
    }

    /// An estimate of the statistical variance of the RTP data packet
    /// interarrival time, measured in timestamp units.
    pub fn jitter(&self) -> u32 {
        (&self.view[JITTER_OFFSET..]).get_u32()
    }

    pub fn set_jitter(&mut self, jitter: u32) {
        (&mut self.view[JITTER_OFFSET..]).put_u32(jitter);
    }

    /// The middle 32 bits out of 64 in the NTP timestamp received as part of
    /// the most recent RTCP sender report (SR) packet from source SSRC.
    pub fn last_sender_report(&self) -> u32 {
        (&self.view[LAST_SR_OFFSET..]).get_u32()
    }

    pub fn set_last_sender_report(&mut self, last_sender_report: u32) {
        (&mut self.view[LAST_SR_OFFSET..]).put_u32(last_sender_report);
    }

    /// The delay, expressed in units of 1/65536 seconds, between receiving the
    /// last SR packet from source SSRC and sending this reception report block.
    pub fn delay(&self) -> u32 {
        (&self.view[DELAY_OFFSET..]).get_u32()
    }

    pub fn set_delay(&mut self, delay: u32) {
        (&mut self.view[DELAY_OFFSET..]).put_u32(delay);
    }

    pub fn dump(&self) -> ReceptionReportDump {
        ReceptionReportDump {
            ssrc: self.ssrc(),
            fraction_lost: self.fraction_lost(),
            total_lost: self.total_lost(),
            last_sequence_number: self.last_sequence_number(),
            jitter: self.jitter(),
            last_sender_report: self.last_sender_report(),
            delay: self.delay(),
        }
    }

    /// Always false: every setter writes the view, so getters never disagree with it.
    pub(crate) fn is_dirty(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceptionReportDump {
    pub ssrc: u32,
    pub fraction_lost: u8,
    pub total_lost: i32,
    pub last_sequence_number: u32,
    pub jitter: u32,
    pub last_sender_report: u32,
    pub delay: u32,
}

/// Reads `count` consecutive blocks starting at `offset`.
///
/// The enclosing report keeps its view, so each block owns a copy of its 24 octets.
pub(crate) fn parse_reports(
    view: &[u8],
    offset: usize,
    count: usize,
) -> std::result::Result<Vec<ReceptionReport>, Error> {
    let end = offset + count * RECEPTION_REPORT_LENGTH;
    if view.len() < end {
        return Err(Error::PacketTooShort);
    }

    Ok(view[offset..end]
        .chunks_exact(RECEPTION_REPORT_LENGTH)
        .map(|block| ReceptionReport {
            view: BytesMut::from(block),
        })
        .collect())
}

impl MarshalSize for ReceptionReport {
    fn marshal_size(&self) -> usize {
        RECEPTION_REPORT_LENGTH
    }
}

impl Marshal for ReceptionReport {
    /// marshal_to encodes the ReceptionReport in binary
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        /*
         *  0                   1                   2                   3
         *  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         * +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * |                              SSRC                             |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * | fraction lost |       cumulative number of packets lost       |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |           extended highest sequence number received           |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |                      interarrival jitter                      |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |                         last SR (LSR)                         |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |                   delay since last SR (DLSR)                  |
         * +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         */
        if buf.remaining_mut() < RECEPTION_REPORT_LENGTH {
            return Err(Error::BufferTooShort.into());
        }

        buf.put_slice(&self.view);

        Ok(RECEPTION_REPORT_LENGTH)
    }
}

impl Unmarshal for ReceptionReport {
    /// unmarshal decodes the ReceptionReport from binary
    fn unmarshal(view: BytesMut) -> Result<Self> {
        if view.len() < RECEPTION_REPORT_LENGTH {
            return Err(Error::PacketTooShort.into());
        }
        if view.len() > RECEPTION_REPORT_LENGTH {
            return Err(Error::InvalidLength.into());
        }

        Ok(ReceptionReport { view })
    }
}

impl_serializable!(ReceptionReport);
