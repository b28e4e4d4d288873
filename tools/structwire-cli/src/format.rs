use std::sync::Arc;

use clap::ValueEnum;
use structwire::{
    Strategy, StructCodec, WireProtocol,
    core::StructSchema,
    shapes::{external_data_unit, service_exception},
};

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Shape {
    ServiceException,
    ExternalDataUnit,
}

impl Shape {
    pub fn schema(self) -> Arc<StructSchema> {
        match self {
            Shape::ServiceException => service_exception(),
            Shape::ExternalDataUnit => external_data_unit(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum StrategyArg {
    #[default]
    Tagged,
    Compact,
}

impl StrategyArg {
    pub fn codec(self) -> StructCodec {
        StructCodec::new(match self {
            StrategyArg::Tagged => Strategy::Tagged,
            StrategyArg::Compact => Strategy::Compact,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum ProtocolArg {
    #[default]
    Binary,
    Varint,
}

impl From<ProtocolArg> for WireProtocol {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::Binary => WireProtocol::Binary,
            ProtocolArg::Varint => WireProtocol::Varint,
        }
    }
}
