/// Backs `Serializable` with the `view` field and an inherent `is_dirty()`.
macro_rules! impl_serializable {
    ($t:ty) => {
        impl util::marshal::Serializable for $t {
            fn view(&self) -> &[u8] {
                &self.view
            }

            fn needs_serialization(&self) -> bool {
                self.is_dirty()
            }
        }
    };
}

/// Backs `PacketPadding` with the `padding` and `dirty` fields.
macro_rules! impl_packet_padding {
    ($t:ty) => {
        impl util::marshal::PacketPadding for $t {
            fn padding(&self) -> u8 {
                self.padding
            }

            fn set_padding(&mut self, padding: u8) {
                if self.padding != padding {
                    self.padding = padding;
                    self.dirty = true;
                }
            }
        }
    };
}

/// Sender and media SSRC accessors of a feedback message, patched in place.
macro_rules! impl_feedback_packet {
    ($t:ty, $format:expr) => {
        impl $crate::feedback::FeedbackPacket for $t {
            fn message_type(&self) -> u8 {
                $format
            }

            fn sender_ssrc(&self) -> u32 {
                bytes::Buf::get_u32(&mut &self.view[$crate::feedback::SENDER_SSRC_OFFSET..])
            }

            fn set_sender_ssrc(&mut self, ssrc: u32) {
                bytes::BufMut::put_u32(
                    &mut &mut self.view[$crate::feedback::SENDER_SSRC_OFFSET..],
                    ssrc,
                )
            }

            fn media_ssrc(&self) -> u32 {
                bytes::Buf::get_u32(&mut &self.view[$crate::feedback::MEDIA_SSRC_OFFSET..])
            }

            fn set_media_ssrc(&mut self, ssrc: u32) {
                bytes::BufMut::put_u32(
                    &mut &mut self.view[$crate::feedback::MEDIA_SSRC_OFFSET..],
                    ssrc,
                )
            }
        }
    };
}

/// Getters and setters for fixed width fields, read and written straight in `view`.
macro_rules! view_accessors {
    ($t:ty { $($(#[$meta:meta])* $get:ident, $set:ident: $ty:ty = $read:ident, $write:ident @ $offset:expr;)* }) => {
        impl $t {
            $(
                $(#[$meta])*
                pub fn $get(&self) -> $ty {
                    bytes::Buf::$read(&mut &self.view[$offset..])
                }

                pub fn $set(&mut self, value: $ty) {
                    bytes::BufMut::$write(&mut &mut self.view[$offset..], value)
                }
            )*
        }
    };
}
