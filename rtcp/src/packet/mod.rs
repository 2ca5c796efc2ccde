
use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use util::marshal::{Marshal, MarshalSize, PacketPadding, Serializable, Unmarshal};

use crate::error::Error;
use crate::extended_jitter_report::*;
use crate::extended_report::*;
use crate::feedback::*;
use crate::goodbye::*;
use crate::header::*;
use crate::payload_feedbacks::picture_loss_indication::*;
use crate::payload_feedbacks::reference_picture_selection_indication::*;
use crate::payload_feedbacks::slice_loss_indication::*;
use crate::raw_packet::*;
use crate::receiver_report::*;
use crate::sender_report::*;
use crate::source_description::*;
use crate::transport_feedbacks::explicit_congestion_notification::*;
use crate::transport_feedbacks::rapid_resynchronization_request::*;
use crate::transport_feedbacks::transport_layer_nack::*;

type Result<T> = std::result::Result<T, util::Error>;

/// RtcpPacket represents an RTCP packet, a protocol used for out-of-band statistics and
/// control information for an RTP session
pub trait RtcpPacket: Serializable + PacketPadding + fmt::Display {
    /// The common header the packet would be written with right now.
    fn header(&self) -> Header;
    fn destination_ssrc(&self) -> Vec<u32>;

    fn version(&self) -> u8 {
        (self.view()[0] >> VERSION_SHIFT) & VERSION_MASK
    }

    fn count(&self) -> u8 {
        self.header().count
    }

    fn packet_type(&self) -> PacketType {
        self.header().packet_type
    }
}

/// Any RTCP packet, by packet type and, for feedback, by message type.
///
/// Types and message types without a dedicated decoder land in `Raw` and
/// `RawFeedback`, keeping their bodies untouched.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Packet {
    SenderReport(SenderReport),
    ReceiverReport(ReceiverReport),
    SourceDescription(SourceDescription),
    Goodbye(Goodbye),
    ExtendedJitterReport(ExtendedJitterReport),
    TransportLayerNack(TransportLayerNack),
    RapidResynchronizationRequest(RapidResynchronizationRequest),
    ExplicitCongestionNotification(ExplicitCongestionNotification),
    PictureLossIndication(PictureLossIndication),
    SliceLossIndication(SliceLossIndication),
    ReferencePictureSelectionIndication(ReferencePictureSelectionIndication),
    ExtendedReport(ExtendedReport),
    RawFeedback(RawFeedbackPacket),
    Raw(RawPacket),
}

macro_rules! each_packet {
    ($packet:expr, $p:ident => $e:expr) => {
        match $packet {
            Packet::SenderReport($p) => $e,
            Packet::ReceiverReport($p) => $e,
            Packet::SourceDescription($p) => $e,
            Packet::Goodbye($p) => $e,
            Packet::ExtendedJitterReport($p) => $e,
            Packet::TransportLayerNack($p) => $e,
            Packet::RapidResynchronizationRequest($p) => $e,
            Packet::ExplicitCongestionNotification($p) => $e,
            Packet::PictureLossIndication($p) => $e,
            Packet::SliceLossIndication($p) => $e,
            Packet::ReferencePictureSelectionIndication($p) => $e,
            Packet::ExtendedReport($p) => $e,
            Packet::RawFeedback($p) => $e,
            Packet::Raw($p) => $e,
        }
    };
}

macro_rules! impl_from_packet {
    ($($variant:ident($t:ty)),*) => {
        $(
            impl From<$t> for Packet {
                fn from(packet: $t) -> Self {
                    Packet::$variant(packet)
                }
            }
        )*

        impl Packet {
            pub fn dump(&self) -> PacketDump {
                match self {
                    $(Packet::$variant(p) => PacketDump::$variant(p.dump()),)*
                }
            }
        }
    };
}

impl_from_packet!(
    SenderReport(SenderReport),
    ReceiverReport(ReceiverReport),
    SourceDescription(SourceDescription),
    Goodbye(Goodbye),
    ExtendedJitterReport(ExtendedJitterReport),
    TransportLayerNack(TransportLayerNack),
    RapidResynchronizationRequest(RapidResynchronizationRequest),
    ExplicitCongestionNotification(ExplicitCongestionNotification),
    PictureLossIndication(PictureLossIndication),
    SliceLossIndication(SliceLossIndication),
    ReferencePictureSelectionIndication(ReferencePictureSelectionIndication),
    ExtendedReport(ExtendedReport),
    RawFeedback(RawFeedbackPacket),
    Raw(RawPacket)
);

/// Plain snapshot of a packet, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum PacketDump {
    SenderReport(SenderReportDump),
    ReceiverReport(ReceiverReportDump),
    SourceDescription(SourceDescriptionDump),
    Goodbye(GoodbyeDump),
    ExtendedJitterReport(ExtendedJitterReportDump),
    TransportLayerNack(TransportLayerNackDump),
    RapidResynchronizationRequest(RapidResynchronizationRequestDump),
    ExplicitCongestionNotification(ExplicitCongestionNotificationDump),
    PictureLossIndication(PictureLossIndicationDump),
    SliceLossIndication(SliceLossIndicationDump),
    ReferencePictureSelectionIndication(ReferencePictureSelectionIndicationDump),
    ExtendedReport(ExtendedReportDump),
    RawFeedback(RawFeedbackPacketDump),
    Raw(RawPacketDump),
}

impl Packet {
    pub(crate) fn is_dirty(&self) -> bool {
        each_packet!(self, p => p.is_dirty())
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        each_packet!(self, p => fmt::Display::fmt(p, f))
    }
}

impl RtcpPacket for Packet {
    fn header(&self) -> Header {
        each_packet!(self, p => p.header())
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        each_packet!(self, p => p.destination_ssrc())
    }

    fn version(&self) -> u8 {
        each_packet!(self, p => p.version())
    }
}

impl MarshalSize for Packet {
    fn marshal_size(&self) -> usize {
        each_packet!(self, p => p.marshal_size())
    }
}

impl Marshal for Packet {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        each_packet!(self, p => p.marshal_to(buf))
    }
}

impl Unmarshal for Packet {
    /// Decodes exactly one packet, picking the decoder from the packet type
    /// and, for feedback messages, from the FMT field.
    fn unmarshal(view: BytesMut) -> Result<Self> {
        let h = Header::parse(&view)?;

        let packet = match h.packet_type {
            PacketType::SenderReport => Packet::SenderReport(SenderReport::unmarshal(view)?),
            PacketType::ReceiverReport => Packet::ReceiverReport(ReceiverReport::unmarshal(view)?),
            PacketType::SourceDescription => {
                Packet::SourceDescription(SourceDescription::unmarshal(view)?)
            }
            PacketType::Goodbye => Packet::Goodbye(Goodbye::unmarshal(view)?),
            PacketType::ExtendedJitterReport => {
                Packet::ExtendedJitterReport(ExtendedJitterReport::unmarshal(view)?)
            }
            PacketType::TransportSpecificFeedback => match h.count {
                FORMAT_TLN => Packet::TransportLayerNack(TransportLayerNack::unmarshal(view)?),
                FORMAT_RRR => Packet::RapidResynchronizationRequest(
                    RapidResynchronizationRequest::unmarshal(view)?,
                ),
                FORMAT_ECN => Packet::ExplicitCongestionNotification(
                    ExplicitCongestionNotification::unmarshal(view)?,
                ),
                format => {
                    log::trace!("RTPFB message type {format} kept as a raw feedback packet");
                    Packet::RawFeedback(RawFeedbackPacket::unmarshal(view)?)
                }
            },
            PacketType::PayloadSpecificFeedback => match h.count {
                FORMAT_PLI => {
                    Packet::PictureLossIndication(PictureLossIndication::unmarshal(view)?)
                }
                FORMAT_SLI => Packet::SliceLossIndication(SliceLossIndication::unmarshal(view)?),
                FORMAT_RPSI => Packet::ReferencePictureSelectionIndication(
                    ReferencePictureSelectionIndication::unmarshal(view)?,
                ),
                format => {
                    log::trace!("PSFB message type {format} kept as a raw feedback packet");
                    Packet::RawFeedback(RawFeedbackPacket::unmarshal(view)?)
                }
            },
            PacketType::ExtendedReport => Packet::ExtendedReport(ExtendedReport::unmarshal(view)?),
            PacketType::ApplicationDefined | PacketType::Unsupported => {
                log::trace!("packet type {} kept as a raw packet", view[1]);
                Packet::Raw(RawPacket::unmarshal(view)?)
            }
        };

        Ok(packet)
    }
}

impl Serializable for Packet {
    fn view(&self) -> &[u8] {
        each_packet!(self, p => p.view())
    }

    fn needs_serialization(&self) -> bool {
        self.is_dirty()
    }
}

impl PacketPadding for Packet {
    fn padding(&self) -> u8 {
        each_packet!(self, p => p.padding())
    }

    fn set_padding(&mut self, padding: u8) {
        each_packet!(self, p => p.set_padding(padding))
    }
}

/// Cuts `raw` into whole packets by their length fields and decodes each one.
///
/// Each packet's view is split off `raw` without copying.
pub(crate) fn split_packets(mut raw: BytesMut) -> Result<Vec<Packet>> {
    let mut packets = vec![];

    while !raw.is_empty() {
        let h = Header::parse(&raw)?;
        let size = (h.length as usize + 1) * 4;
        if size > raw.len() {
            return Err(Error::PacketTooShort.into());
        }

        packets.push(Packet::unmarshal(raw.split_to(size))?);
    }

    Ok(packets)
}

/// marshal takes an array of Packets and serializes them to a single buffer
pub fn marshal(packets: &[Packet]) -> Result<Bytes> {
    let size = packets.iter().map(|p| p.marshal_size()).sum();
    let mut out = BytesMut::with_capacity(size);
    for p in packets {
        out.put(p.marshal()?);
    }
    Ok(out.freeze())
}

/// Unmarshal takes an entire udp datagram (which may consist of multiple RTCP packets) and
/// returns the unmarshaled packets it contains.
///
/// Unlike `CompoundPacket`, no rule about the order or padding of the packets
/// is applied.
pub fn unmarshal(raw: BytesMut) -> Result<Vec<Packet>> {
    let packets = split_packets(raw)?;
    if packets.is_empty() {
        return Err(Error::InvalidHeader.into());
    }
    Ok(packets)
}
