#[cfg(test)]
mod explicit_congestion_notification_test;

use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::feedback::*;
use crate::header::*;
use crate::packet::RtcpPacket;

type Result<T> = std::result::Result<T, util::Error>;

const ECN_FCI_LENGTH: usize = 20;
const ECN_LENGTH: usize = FEEDBACK_HEADER_LENGTH + ECN_FCI_LENGTH;

const EXTENDED_HIGHEST_SEQUENCE_OFFSET: usize = FEEDBACK_HEADER_LENGTH;
const ECT0_OFFSET: usize = EXTENDED_HIGHEST_SEQUENCE_OFFSET + 4;
const ECT1_OFFSET: usize = ECT0_OFFSET + 4;
const ECN_CE_OFFSET: usize = ECT1_OFFSET + 4;
const NOT_ECT_OFFSET: usize = ECN_CE_OFFSET + 2;
const LOST_OFFSET: usize = NOT_ECT_OFFSET + 2;
const DUPLICATES_OFFSET: usize = LOST_OFFSET + 2;

/// ExplicitCongestionNotification reports the ECN markings a receiver saw (RFC 6679 §5.1).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Extended Highest Sequence Number                              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | ECT (0) Counter                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | ECT (1) Counter                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | ECN-CE Counter                | not-ECT Counter               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Lost Packets Counter          | Duplication Counter           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ExplicitCongestionNotification {
    view: BytesMut,
    padding: u8,
    dirty: bool,
}

impl Default for ExplicitCongestionNotification {
    fn default() -> Self {
        ExplicitCongestionNotification {
            view: empty_view(PacketType::TransportSpecificFeedback, FORMAT_ECN, ECN_LENGTH),
            padding: 0,
            dirty: false,
        }
    }
}

impl fmt::Display for ExplicitCongestionNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExplicitCongestionNotification {:x} {:x} seq {} ect0 {} ect1 {} ce {} not-ect {} lost {} dup {}",
            self.sender_ssrc(),
            self.media_ssrc(),
            self.extended_highest_sequence(),
            self.ect0_counter(),
            self.ect1_counter(),
            self.ecn_ce_counter(),
            self.not_ect_counter(),
            self.lost_packets_counter(),
            self.duplication_counter()
        )
    }
}

impl ExplicitCongestionNotification {
    pub fn new(sender_ssrc: u32, media_ssrc: u32) -> Self {
        let mut ecn = ExplicitCongestionNotification::default();
        ecn.set_sender_ssrc(sender_ssrc);
        ecn.set_media_ssrc(media_ssrc);
        ecn
    }

    fn get_u32_at(&self, offset: usize) -> u32 {
        (&self.view[offset..]).get_u32()
    }

    fn put_u32_at(&mut self, offset: usize, value: u32) {
        (&mut self.view[offset..]).put_u32(value);
    }

    fn get_u16_at(&self, offset: usize) -> u16 {
        (&self.view[offset..]).get_u16()
    }

    fn put_u16_at(&mut self, offset: usize, value: u16) {
        (&mut self.view[offset..]).put_u16(value);
    }

    pub fn extended_highest_sequence(&self) -> u32 {
        self.get_u32_at(EXTENDED_HIGHEST_SEQUENCE_OFFSET)
    }

    pub fn set_extended_highest_sequence(&mut self, seq: u32) {
        self.put_u32_at(EXTENDED_HIGHEST_SEQUENCE_OFFSET, seq);
    }

    pub fn ect0_counter(&self) -> u32 {
        self.get_u32_at(ECT0_OFFSET)
    }

    pub fn set_ect0_counter(&mut self, counter: u32) {
        self.put_u32_at(ECT0_OFFSET, counter);
    }

    pub fn ect1_counter(&self) -> u32 {
        self.get_u32_at(ECT1_OFFSET)
    }

    pub fn set_ect1_counter(&mut self, counter: u32) {
        self.put_u32_at(ECT1_OFFSET, counter);
    }

    pub fn ecn_ce_counter(&self) -> u16 {
        self.get_u16_at(ECN_CE_OFFSET)
    }

    pub fn set_ecn_ce_counter(&mut self, counter: u16) {
        self.put_u16_at(ECN_CE_OFFSET, counter);
    }

    pub fn not_ect_counter(&self) -> u16 {
        self.get_u16_at(NOT_ECT_OFFSET)
    }

    pub fn set_not_ect_counter(&mut self, counter: u16) {
        self.put_u16_at(NOT_ECT_OFFSET, counter);
    }

    pub fn lost_packets_counter(&self) -> u16 {
        self.get_u16_at(LOST_OFFSET)
    }

    pub fn set_lost_packets_counter(&mut self, counter: u16) {
        self.put_u16_at(LOST_OFFSET, counter);
    }

    pub fn duplication_counter(&self) -> u16 {
        self.get_u16_at(DUPLICATES_OFFSET)
    }

    pub fn set_duplication_counter(&mut self, counter: u16) {
        self.put_u16_at(DUPLICATES_OFFSET, counter);
    }

    pub fn dump(&self) -> ExplicitCongestionNotificationDump {
        ExplicitCongestionNotificationDump {
            padding: self.padding,
            sender_ssrc: self.sender_ssrc(),
            media_ssrc: self.media_ssrc(),
            extended_highest_sequence: self.extended_highest_sequence(),
            ect0_counter: self.ect0_counter(),
            ect1_counter: self.ect1_counter(),
            ecn_ce_counter: self.ecn_ce_counter(),
            not_ect_counter: self.not_ect_counter(),
            lost_packets_counter: self.lost_packets_counter(),
            duplication_counter: self.duplication_counter(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplicitCongestionNotificationDump {
    pub padding: u8,
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
    pub extended_highest_sequence: u32,
    pub ect0_counter: u32,
    pub ect1_counter: u32,
    pub ecn_ce_counter: u16,
    pub not_ect_counter: u16,
    pub lost_packets_counter: u16,
    pub duplication_counter: u16,
}

impl RtcpPacket for ExplicitCongestionNotification {
    fn header(&self) -> Header {
        Header::describe(
            PacketType::TransportSpecificFeedback,
            FORMAT_ECN,
            self.marshal_size(),
            self.padding,
        )
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc()]
    }
}

impl MarshalSize for ExplicitCongestionNotification {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        ECN_LENGTH + self.padding as usize
    }
}

impl Marshal for ExplicitCongestionNotification {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::BufferTooShort.into());
        }
        if !self.is_dirty() {
            buf[..size].copy_from_slice(&self.view);
            return Ok(size);
        }

        let n = marshal_header(
            buf,
            size,
            FORMAT_ECN,
            PacketType::TransportSpecificFeedback as u8,
            self.padding,
        )?;
        buf = &mut buf[n..];
        buf.put_slice(&self.view[SENDER_SSRC_OFFSET..ECN_LENGTH]);

        Ok(size)
    }
}

impl Unmarshal for ExplicitCongestionNotification {
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let padding = parse_feedback(&view, PacketType::TransportSpecificFeedback, FORMAT_ECN)?;
        let len = view.len() - padding as usize;
        if len < ECN_LENGTH {
            return Err(Error::PacketTooShort.into());
        }
        if len != ECN_LENGTH {
            return Err(Error::InvalidLength.into());
        }

        Ok(ExplicitCongestionNotification {
            view,
            padding,
            dirty: false,
        })
    }
}

impl_serializable!(ExplicitCongestionNotification);
impl_packet_padding!(ExplicitCongestionNotification);
impl_feedback_packet!(ExplicitCongestionNotification, FORMAT_ECN);
