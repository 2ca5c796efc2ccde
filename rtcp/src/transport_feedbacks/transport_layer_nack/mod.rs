
use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::feedback::*;
use crate::header::*;
use crate::packet::RtcpPacket;

type Result<T> = std::result::Result<T, util::Error>;

/// PacketBitmap shouldn't be used like a normal integral,
/// so it's type is masked here. Access it with PacketList().
type PacketBitmap = u16;

const NACK_PAIR_LENGTH: usize = 4;
/// The bitmask reaches 16 packets past the packet id.
const NACK_SPREAD_MAX: u16 = 16;

/// NackPair is a wire-representation of a collection of
/// Lost RTP packets
#[derive(Debug, PartialEq, Eq, Default, Clone, Copy, Serialize)]
pub struct NackPair {
    /// ID of lost packets
    pub packet_id: u16,
    /// Bitmask of following lost packets
    pub lost_packets: PacketBitmap,
}

impl NackPair {
    pub fn new(seq: u16) -> Self {
        Self {
            packet_id: seq,
            lost_packets: Default::default(),
        }
    }

    /// Lost sequence numbers in wire order: the packet id, then one per set bit.
    pub fn iter(&self) -> impl Iterator<Item = u16> {
        let NackPair {
            packet_id,
            lost_packets,
        } = *self;
        let following = (0..NACK_SPREAD_MAX)
            .filter(move |&bit| lost_packets & (1u16 << bit) != 0)
            .map(move |bit| packet_id.wrapping_add(bit + 1));

        std::iter::once(packet_id).chain(following)
    }

    /// PacketList returns a list of Nack'd packets that's referenced by a NackPair
    pub fn packet_list(&self) -> Vec<u16> {
        self.iter().collect()
    }

    /// Visits the lost sequence numbers until `f` returns false.
    pub fn range<F>(&self, f: F)
    where
        F: Fn(u16) -> bool,
    {
        for packet_id in self.iter() {
            if !f(packet_id) {
                return;
            }
        }
    }
}

/// The lost sequence numbers one NACK item stands for: the packet id, then
/// `pid + 1 + i` for every set bit `i`.
pub fn parse_nack_item(packet_id: u16, lost_packets: u16) -> Vec<u16> {
    NackPair {
        packet_id,
        lost_packets,
    }
    .packet_list()
}

/// Builds the single NACK item covering `seq_nos`. The smallest sequence number
/// becomes the packet id and every other one must lie at most 16 past it.
pub fn create_nack_item(seq_nos: &[u16]) -> std::result::Result<NackPair, Error> {
    let packet_id = *seq_nos.iter().min().ok_or(Error::EmptyNackSequence)?;

    let mut nack_pair = NackPair::new(packet_id);
    for &seq in seq_nos {
        if seq == packet_id {
            continue;
        }
        let offset = seq - packet_id;
        if offset > NACK_SPREAD_MAX {
            return Err(Error::NackSpreadTooLarge);
        }
        nack_pair.lost_packets |= 1 << (offset - 1);
    }

    Ok(nack_pair)
}

/// Splits an ordered list of sequence numbers into as many NACK items as needed.
pub fn nack_pairs_from_sequence_numbers(seq_nos: &[u16]) -> Vec<NackPair> {
    if seq_nos.is_empty() {
        return vec![];
    }

    let mut nack_pair = NackPair::new(seq_nos[0]);
    let mut pairs = vec![];

    for &seq in seq_nos.iter().skip(1) {
        if seq == nack_pair.packet_id {
            continue;
        }
        let offset = seq.wrapping_sub(nack_pair.packet_id);
        if seq < nack_pair.packet_id || offset > NACK_SPREAD_MAX {
            pairs.push(nack_pair);
            nack_pair = NackPair::new(seq);
            continue;
        }
        nack_pair.lost_packets |= 1 << (offset - 1);
    }

    pairs.push(nack_pair);

    pairs
}

/// The TransportLayerNack packet informs the encoder about the loss of a transport packet
/// ## Specifications
///
/// * [RFC 4585 §6.2.1]
///
/// [RFC 4585 §6.2.1]: https://tools.ietf.org/html/rfc4585#section-6.2.1
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TransportLayerNack {
    view: BytesMut,
    nacks: Vec<NackPair>,
    padding: u8,
    dirty: bool,
}

impl Default for TransportLayerNack {
    fn default() -> Self {
        TransportLayerNack {
            view: empty_view(
                PacketType::TransportSpecificFeedback,
                FORMAT_TLN,
                FEEDBACK_HEADER_LENGTH,
            ),
            nacks: vec![],
            padding: 0,
            dirty: false,
        }
    }
}

impl fmt::Display for TransportLayerNack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = format!("TransportLayerNack from {:x}\n", self.sender_ssrc());
        out += format!("\tMedia Ssrc {:x}\n", self.media_ssrc()).as_str();
        out += "\tID\tLostPackets\n";
        for nack in &self.nacks {
            out += format!("\t{}\t{:b}\n", nack.packet_id, nack.lost_packets).as_str();
        }
        write!(f, "{out}")
    }
}

impl TransportLayerNack {
    pub fn new(sender_ssrc: u32, media_ssrc: u32) -> Self {
        let mut nack = TransportLayerNack::default();
        nack.set_sender_ssrc(sender_ssrc);
        nack.set_media_ssrc(media_ssrc);
        nack
    }

    pub fn nacks(&self) -> &[NackPair] {
        &self.nacks
    }

    pub fn set_nacks(&mut self, nacks: Vec<NackPair>) {
        self.nacks = nacks;
        self.dirty = true;
    }

    pub fn add_nack(&mut self, nack: NackPair) {
        self.nacks.push(nack);
        self.dirty = true;
    }

    /// Every sequence number reported lost, item by item.
    pub fn lost_sequence_numbers(&self) -> Vec<u16> {
        self.nacks.iter().flat_map(|n| n.packet_list()).collect()
    }

    pub fn dump(&self) -> TransportLayerNackDump {
        TransportLayerNackDump {
            padding: self.padding,
            sender_ssrc: self.sender_ssrc(),
            media_ssrc: self.media_ssrc(),
            nacks: self.nacks.clone(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportLayerNackDump {
    pub padding: u8,
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
    pub nacks: Vec<NackPair>,
}

impl RtcpPacket for TransportLayerNack {
    fn header(&self) -> Header {
        Header::describe(
            PacketType::TransportSpecificFeedback,
            FORMAT_TLN,
            self.marshal_size(),
            self.padding,
        )
    }

    /// destination_ssrc returns an array of SSRC values that this packet refers to.
    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc()]
    }
}

impl MarshalSize for TransportLayerNack {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        FEEDBACK_HEADER_LENGTH + self.nacks.len() * NACK_PAIR_LENGTH + self.padding as usize
    }
}

impl Marshal for TransportLayerNack {
    /// Marshal encodes the packet in binary.
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        /*
         *  0                   1                   2                   3
         *  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |            PID                |             BLP               |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         */
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
            FORMAT_TLN,
            PacketType::TransportSpecificFeedback as u8,
            self.padding,
        )?;
        buf = &mut buf[n..];

        buf.put_slice(&self.view[SENDER_SSRC_OFFSET..FEEDBACK_HEADER_LENGTH]);
        for nack in &self.nacks {
            buf.put_u16(nack.packet_id);
            buf.put_u16(nack.lost_packets);
        }

        Ok(size)
    }
}

impl Unmarshal for TransportLayerNack {
    /// Unmarshal decodes the TransportLayerNack from binary
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let padding = parse_feedback(&view, PacketType::TransportSpecificFeedback, FORMAT_TLN)?;
        let end = view.len() - padding as usize;

        let fci = &view[FEEDBACK_HEADER_LENGTH..end];
        if fci.len() % NACK_PAIR_LENGTH != 0 {
            return Err(Error::InvalidLength.into());
        }

        let nacks = fci
            .chunks_exact(NACK_PAIR_LENGTH)
            .map(|mut item| NackPair {
                packet_id: item.get_u16(),
                lost_packets: item.get_u16(),
            })
            .collect();

        Ok(TransportLayerNack {
            view,
            nacks,
            padding,
            dirty: false,
        })
    }
}

impl_serializable!(TransportLayerNack);
impl_packet_padding!(TransportLayerNack);
impl_feedback_packet!(TransportLayerNack, FORMAT_TLN);
