pub mod payment_gateway;
pub mod purchase;
