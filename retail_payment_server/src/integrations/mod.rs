mod gateway_provider;

pub use gateway_provider::GatewayProvider;
