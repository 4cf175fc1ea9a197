use std::ops::Deref;

/// Maximum number of modes
pub const CAPACITY: usize = 96;

const NOLL_ZERNIKES: [&str; 23] = [
    "Tilt Y",
    "Tilt X",
    "Power",
    "Astig 45",
    "Astig X",
    "Coma X",
    "Coma Y",
    "Trefoil Y",
    "Trefoil 45",
    "Primary Spherical",
    "Secondary Astig Y",
    "Secondary Astig 45",
    "Quadrafoil Y",
    "Quadrafoil 45",
    "Secondary Coma X",
    "Secondary Coma Y",
    "Secondary Trefoil 45",
    "Secondary Trefoil Y",
    "Pentafoil 45",
    "Pentafoil Y",
    "Secondary Spherical",
    "Tertiary Astig 45",
    "Tertiary Astig Y",
];

/// Noll ordered Zernike mode names
///
/// The first 23 modes are named after the aberration they describe,
/// the following ones are named `Mode #` with `#` the 1-based mode index.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeCatalog(Vec<String>);

impl ModeCatalog {
    /// Creates the catalog of the [CAPACITY] Noll ordered modes
    pub fn noll() -> Self {
        Self(
            NOLL_ZERNIKES
                .iter()
                .map(|name| name.to_string())
                .chain((NOLL_ZERNIKES.len()..CAPACITY).map(|i| format!("Mode {}", i + 1)))
                .collect(),
        )
    }
    /// Returns the name of the mode at `index`
    pub fn name(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(|name| name.as_str())
    }
    /// Returns the names of the first `n_mode` modes
    pub fn names(&self, n_mode: usize) -> &[String] {
        &self.0[..n_mode.min(self.0.len())]
    }
}

impl Default for ModeCatalog {
    fn default() -> Self {
        Self::noll()
    }
}

impl Deref for ModeCatalog {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
