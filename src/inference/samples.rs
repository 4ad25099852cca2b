use clap::ValueEnum;

use crate::error::Result;
use crate::inference::network::Network;

/// The networks bundled with the `bn-query` binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SampleNetwork {
    /// FIRE -> {SMOKE, ALARM}, ALARM -> LEAVING -> REPORT
    #[value(name = "fire-alarm", alias = "BNpart2")]
    FireAlarm,
    /// DAY -> {PT, CAR} -> TF -> CO
    #[value(name = "multiply-connected", alias = "multiplyConnected")]
    MultiplyConnected,
    /// DAY -> CAR -> TF -> CO -> TCP -> ESA
    #[value(name = "singly-connected", alias = "singlyConnected")]
    SinglyConnected,
}

impl SampleNetwork {
    pub fn build(self) -> Result<Network> {
        match self {
            SampleNetwork::FireAlarm => fire_alarm(),
            SampleNetwork::MultiplyConnected => multiply_connected(),
            SampleNetwork::SinglyConnected => singly_connected(),
        }
    }
}

const BINARY: &[&str] = &["T", "F"];

pub fn fire_alarm() -> Result<Network> {
    let mut net = Network::new();
    net.add_node("FIRE", &[], BINARY, &["FIRE = T: 0.01", "FIRE = F: 0.99"])?;
    net.add_node(
        "SMOKE",
        &["FIRE"],
        BINARY,
        &[
            "SMOKE = T, FIRE = T: 0.9",
            "SMOKE = F, FIRE = T: 0.1",
            "SMOKE = T, FIRE = F: 0.01",
            "SMOKE = F, FIRE = F: 0.99",
        ],
    )?;
    net.add_node(
        "ALARM",
        &["FIRE"],
        BINARY,
        &[
            "ALARM = T, FIRE = T: 0.5",
            "ALARM = F, FIRE = T: 0.5",
            "ALARM = T, FIRE = F: 0.85",
            "ALARM = F, FIRE = F: 0.15",
        ],
    )?;
    net.add_node(
        "LEAVING",
        &["ALARM"],
        BINARY,
        &[
            "LEAVING = T, ALARM = T: 0.88",
            "LEAVING = F, ALARM = T: 0.12",
            "LEAVING = T, ALARM = F: 0.0",
            "LEAVING = F, ALARM = F: 1.0",
        ],
    )?;
    net.add_node(
        "REPORT",
        &["LEAVING"],
        BINARY,
        &[
            "REPORT = T, LEAVING = T: 0.75",
            "REPORT = F, LEAVING = T: 0.25",
            "REPORT = T, LEAVING = F: 0.01",
            "REPORT = F, LEAVING = F: 0.99",
        ],
    )?;
    Ok(net)
}

pub fn multiply_connected() -> Result<Network> {
    let mut net = Network::new();
    net.add_node("DAY", &[], BINARY, &["DAY = T: 0.78", "DAY = F: 0.22"])?;
    net.add_node(
        "PT",
        &["DAY"],
        BINARY,
        &[
            "PT = T, DAY=T: 0.375",
            "PT = F, DAY=T: 0.625",
            "PT = T, DAY=F: 0.05",
            "PT = F, DAY=F: 0.95",
        ],
    )?;
    net.add_node(
        "CAR",
        &["DAY"],
        BINARY,
        &[
            "CAR = T, DAY = T: 0.6",
            "CAR = F, DAY = T: 0.4",
            "CAR = T, DAY = F: 0.3",
            "CAR = F, DAY = F: 0.7",
        ],
    )?;
    net.add_node(
        "TF",
        &["PT", "CAR"],
        BINARY,
        &[
            "TF = T, PT = T, CAR = T: 0.8",
            "TF = F, PT = T, CAR = T: 0.2",
            "TF = T, PT = T, CAR = F: 0.6",
            "TF = F, PT = T, CAR = F: 0.4",
            "TF = T, PT = F, CAR = T: 0.55",
            "TF = F, PT = F, CAR = T: 0.45",
            "TF = T, PT = F, CAR = F: 0.15",
            "TF = F, PT = F, CAR = F: 0.85",
        ],
    )?;
    net.add_node(
        "CO",
        &["TF"],
        BINARY,
        &[
            "CO = T, TF = T: 0.95",
            "CO = F, TF = T: 0.05",
            "CO = T, TF = F: 0.05",
            "CO = F, TF = F: 0.95",
        ],
    )?;
    Ok(net)
}

pub fn singly_connected() -> Result<Network> {
    let mut net = Network::new();
    net.add_node("DAY", &[], BINARY, &["DAY = T: 0.78", "DAY = F: 0.22"])?;
    net.add_node(
        "CAR",
        &["DAY"],
        BINARY,
        &[
            "CAR = T, DAY = T: 0.6",
            "CAR = F, DAY = T: 0.4",
            "CAR = T, DAY = F: 0.3",
            "CAR = F, DAY = F: 0.7",
        ],
    )?;
    net.add_node(
        "TF",
        &["CAR"],
        BINARY,
        &[
            "TF = T, CAR = T: 0.8",
            "TF = F, CAR = T: 0.2",
            "TF = T, CAR = F: 0.6",
            "TF = F, CAR = F: 0.4",
        ],
    )?;
    net.add_node(
        "CO",
        &["TF"],
        BINARY,
        &[
            "CO = T, TF = T: 0.95",
            "CO = F, TF = T: 0.05",
            "CO = T, TF = F: 0.05",
            "CO = F, TF = F: 0.95",
        ],
    )?;
    net.add_node(
        "TCP",
        &["CO"],
        BINARY,
        &[
            "TCP = T, CO = T: 0.8",
            "TCP = F, CO = T: 0.2",
            "TCP = T, CO = F: 0.25",
            "TCP = F, CO = F: 0.75",
        ],
    )?;
    net.add_node(
        "ESA",
        &["TCP"],
        BINARY,
        &[
            "ESA = T, TCP = T: 0.9",
            "ESA = F, TCP = T: 0.1",
            "ESA = T, TCP = F: 0.1",
            "ESA = F, TCP = F: 0.9",
        ],
    )?;
    Ok(net)
}
