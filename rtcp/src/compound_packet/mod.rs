
use std::fmt;

use bytes::BytesMut;
use serde::Serialize;
use util::marshal::{Marshal, MarshalSize, PacketPadding, Unmarshal};

use crate::error::Error;
use crate::packet::*;

type Result<T> = std::result::Result<T, util::Error>;

/// A CompoundPacket is a collection of RTCP packets transmitted as a single packet with
/// the underlying protocol (for example UDP).
///
/// To maximize the resolution of reception statistics, the first Packet in a CompoundPacket
/// must always be either a SenderReport or a ReceiverReport.  This is true even if no data
/// has been sent or received, in which case an empty ReceiverReport must be sent, and even
/// if the only other RTCP packet in the compound packet is a Goodbye.
///
/// Next, a SourceDescription containing a CNAME item must be included in each CompoundPacket
/// to identify the source and to begin associating media for purposes such as lip-sync.
///
/// Other RTCP packet types may follow in any order. Packet types may appear more than once.
///
/// Parsing only checks the framing and that no packet but the last is padded;
/// the ordering rules above are checked by `validate`.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct CompoundPacket {
    view: BytesMut,
    packets: Vec<Packet>,
    dirty: bool,
}

impl fmt::Display for CompoundPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = format!("CompoundPacket ({} packets)\n", self.packets.len());
        for p in &self.packets {
            out += format!("{p}\n").as_str();
        }
        write!(f, "{out}")
    }
}

impl CompoundPacket {
    pub fn new(packets: Vec<Packet>) -> Self {
        CompoundPacket {
            view: BytesMut::new(),
            packets,
            dirty: true,
        }
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    /// Gives write access to the packets; the compound is re-serialized afterwards.
    pub fn packets_mut(&mut self) -> &mut Vec<Packet> {
        self.dirty = true;
        &mut self.packets
    }

    pub fn set_packets(&mut self, packets: Vec<Packet>) {
        self.packets = packets;
        self.dirty = true;
    }

    pub fn add_packet(&mut self, packet: impl Into<Packet>) {
        self.packets.push(packet.into());
        self.dirty = true;
    }

    /// destination_ssrc returns the synchronization sources associated with this
    /// CompoundPacket's reception report.
    pub fn destination_ssrc(&self) -> Vec<u32> {
        self.packets
            .first()
            .map(RtcpPacket::destination_ssrc)
            .unwrap_or_default()
    }

    /// Validate returns an error if this is not an RFC-compliant CompoundPacket.
    pub fn validate(&self) -> Result<()> {
        if self.packets.is_empty() {
            return Err(Error::EmptyCompound.into());
        }
        check_padding(&self.packets)?;

        // SenderReport and ReceiverReport are the only types that
        // are allowed to be the first packet in a compound datagram
        match self.packets[0] {
            Packet::SenderReport(_) | Packet::ReceiverReport(_) => {}
            _ => return Err(Error::BadFirstPacket.into()),
        }

        for p in &self.packets[1..] {
            match p {
                // If the number of ReceptionReports exceeds 31 additional ReceiverReports
                // can be included here.
                Packet::ReceiverReport(_) => continue,
                // A SourceDescription containing a CNAME must be included in every
                // CompoundPacket.
                Packet::SourceDescription(sdes) => {
                    if sdes.cname().is_none() {
                        return Err(Error::MissingCname.into());
                    }
                    return Ok(());
                }
                // Other packets are not permitted before the CNAME
                _ => return Err(Error::PacketBeforeCname.into()),
            }
        }

        // CNAME never reached
        Err(Error::MissingCname.into())
    }

    /// CNAME returns the CNAME that *must* be present in every CompoundPacket
    pub fn cname(&self) -> Result<&[u8]> {
        if self.packets.is_empty() {
            return Err(Error::EmptyCompound.into());
        }

        for p in &self.packets[1..] {
            match p {
                Packet::SourceDescription(sdes) => {
                    return sdes.cname().ok_or_else(|| Error::MissingCname.into());
                }
                Packet::ReceiverReport(_) => continue,
                _ => return Err(Error::PacketBeforeCname.into()),
            }
        }

        Err(Error::MissingCname.into())
    }

    pub fn dump(&self) -> CompoundPacketDump {
        CompoundPacketDump {
            packets: self.packets.iter().map(Packet::dump).collect(),
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty || self.packets.iter().any(Packet::is_dirty)
    }
}

/// Only the last packet of a compound may carry padding (RFC 3550 6.4.1).
fn check_padding(packets: &[Packet]) -> std::result::Result<(), Error> {
    let Some((_, init)) = packets.split_last() else {
        return Ok(());
    };
    if init.iter().any(|p| p.padding() > 0) {
        return Err(Error::PaddedPacketNotLast);
    }
    Ok(())
}

/// Plain snapshot of every packet in a compound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompoundPacketDump {
    pub packets: Vec<PacketDump>,
}

impl MarshalSize for CompoundPacket {
    fn marshal_size(&self) -> usize {
        if !self.is_dirty() {
            return self.view.len();
        }
        self.packets.iter().map(|p| p.marshal_size()).sum()
    }
}

impl Marshal for CompoundPacket {
    /// Marshal encodes the CompoundPacket as binary.
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::BufferTooShort.into());
        }
        if !self.is_dirty() {
            buf[..size].copy_from_slice(&self.view);
            return Ok(size);
        }
        check_padding(&self.packets)?;

        for p in &self.packets {
            let n = p.marshal_to(buf)?;
            buf = &mut buf[n..];
        }

        Ok(size)
    }
}

impl Unmarshal for CompoundPacket {
    /// Splits the view into packets by their length fields. The cursor must
    /// land exactly on the end of the view.
    ///
    /// The compound keeps `view` whole, so its packets are decoded from one copy of it.
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let packets = split_packets(view.clone())?;
        if packets.is_empty() {
            return Err(Error::EmptyCompound.into());
        }
        check_padding(&packets)?;

        Ok(CompoundPacket {
            view,
            packets,
            dirty: false,
        })
    }
}

impl_serializable!(CompoundPacket);
