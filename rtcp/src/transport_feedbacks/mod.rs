pub mod explicit_congestion_notification;
pub mod rapid_resynchronization_request;
pub mod transport_layer_nack;
