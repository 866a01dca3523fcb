//! Demand sectors and their declared energy carriers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A hydrogen demand category.
///
/// Transport sectors displace on-road fuel use (gasoline for light duty,
/// diesel for heavy duty). The industrial sectors displace high-temperature
/// combustion fuel, the kind of process heat most promising for hydrogen.
/// `ExistingH2` carries demand already served by SMR hydrogen plants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sector {
    LdTransport,
    HdTransport,
    IronSteel,
    Aluminum,
    Cement,
    Refining,
    Chemicals,
    Glass,
    ExistingH2,
}

/// The energy carrier a sector's baseline is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyCarrier {
    /// Gallons of gasoline.
    Gasoline,
    /// Gallons of diesel.
    Diesel,
    /// Million Btu of high-temperature combustion fuel.
    ProcessFuel,
    /// Kilograms of hydrogen (already hydrogen-denominated).
    Hydrogen,
}

impl Sector {
    pub const ALL: [Sector; 9] = [
        Sector::LdTransport,
        Sector::HdTransport,
        Sector::IronSteel,
        Sector::Aluminum,
        Sector::Cement,
        Sector::Refining,
        Sector::Chemicals,
        Sector::Glass,
        Sector::ExistingH2,
    ];

    pub fn carrier(self) -> EnergyCarrier {
        match self {
            Sector::LdTransport => EnergyCarrier::Gasoline,
            Sector::HdTransport => EnergyCarrier::Diesel,
            Sector::IronSteel
            | Sector::Aluminum
            | Sector::Cement
            | Sector::Refining
            | Sector::Chemicals
            | Sector::Glass => EnergyCarrier::ProcessFuel,
            Sector::ExistingH2 => EnergyCarrier::Hydrogen,
        }
    }

    pub fn is_transport(self) -> bool {
        matches!(self, Sector::LdTransport | Sector::HdTransport)
    }

    pub fn is_industry(self) -> bool {
        matches!(self.carrier(), EnergyCarrier::ProcessFuel)
    }

    pub fn name(self) -> &'static str {
        match self {
            Sector::LdTransport => "LD transport",
            Sector::HdTransport => "HD transport",
            Sector::IronSteel => "Iron & Steel",
            Sector::Aluminum => "Aluminum",
            Sector::Cement => "Cement",
            Sector::Refining => "Refining",
            Sector::Chemicals => "Chemicals",
            Sector::Glass => "Glass",
            Sector::ExistingH2 => "Existing H2",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_covers_every_variant() {
        assert_eq!(Sector::ALL.len(), 9);
        for s in Sector::ALL {
            // Every sector declares a carrier.
            let _ = s.carrier();
        }
    }

    #[test]
    fn test_carriers() {
        assert_eq!(Sector::LdTransport.carrier(), EnergyCarrier::Gasoline);
        assert_eq!(Sector::HdTransport.carrier(), EnergyCarrier::Diesel);
        assert_eq!(Sector::Cement.carrier(), EnergyCarrier::ProcessFuel);
        assert_eq!(Sector::ExistingH2.carrier(), EnergyCarrier::Hydrogen);
        assert!(Sector::HdTransport.is_transport());
        assert!(Sector::Glass.is_industry());
        assert!(!Sector::ExistingH2.is_industry());
    }
}
