//! Field Schema Registry
//!
//! The closed set of canonical tablet fields, their legacy aliases and the
//! flags the rest of the crate keys off: calculated fields are derived and
//! never authoritative, system fields carry record bookkeeping and serialize
//! with an underscore prefix.
//!
//! Everything that needs to know about field names goes through this table.
//! Unknown names simply have no descriptor and are treated as free-form text.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Prefix used for system fields in external documents
pub const SYSTEM_PREFIX: &str = "_";

// =============================================================================
// Field
// =============================================================================

/// A canonical tablet field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    // === System ===
    Id,
    CreateDate,
    ModifiedDate,

    // === Model ===
    ModelBrand,
    ModelId,
    ModelName,
    ModelFamily,
    ModelLaunchYear,
    ModelStatus,
    ModelAudience,
    ModelType,
    ModelProductLink,
    ModelIncludedPen,
    ModelAge,

    // === Physical ===
    PhysicalDimensions,
    PhysicalWeight,
    PhysicalWeightWithStand,

    // === Digitizer ===
    DigitizerDimensions,
    DigitizerDiagonal,
    DigitizerArea,
    DigitizerAspectRatio,
    DigitizerPressureLevels,
    DigitizerReportRate,
    DigitizerResolution,
    DigitizerPenTechnology,
    DigitizerTilt,
    DigitizerMaxHover,
    DigitizerAccuracyCenter,
    DigitizerAccuracyCorner,
    DigitizerSupportsTouch,

    // === Display ===
    DisplayResolution,
    DisplaySize,
    DisplayPixelDensity,
    DisplayRefreshRate,
    DisplayResponseTime,
    DisplayBrightness,
    DisplayContrast,
    DisplayColorGamut,
    DisplayColorBitDepth,
    DisplayViewingAngle,
    DisplayPanelTech,
    DisplayAntiGlare,
    DisplayLamination,
}

impl Field {
    /// The registry descriptor for this field
    pub fn descriptor(self) -> &'static FieldDescriptor {
        // The table is built from `DESCRIPTORS`, which covers every variant.
        &DESCRIPTORS[self.ordinal()]
    }

    /// Canonical name of this field
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Name used in external documents (system fields are prefixed)
    pub fn external_name(self) -> String {
        let descriptor = self.descriptor();
        if descriptor.is_system {
            format!("{}{}", SYSTEM_PREFIX, descriptor.name)
        } else {
            descriptor.name.to_string()
        }
    }

    pub fn is_calculated(self) -> bool {
        self.descriptor().is_calculated
    }

    pub fn is_system(self) -> bool {
        self.descriptor().is_system
    }

    pub fn kind(self) -> ValueKind {
        self.descriptor().kind
    }

    /// Resolve a canonical, legacy or system-prefixed name
    pub fn from_name(name: &str) -> Option<Field> {
        registry().resolve(name)
    }

    /// All fields in registry order
    pub fn all() -> impl Iterator<Item = Field> {
        DESCRIPTORS.iter().map(|d| d.field)
    }

    fn ordinal(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Field Descriptor
// =============================================================================

/// How a field's raw string is interpreted at read time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    Numeric,
}

/// Registry entry for one canonical field
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub field: Field,
    pub name: &'static str,
    /// Legacy names, tried in declared order after the canonical name
    pub aliases: &'static [&'static str],
    pub is_calculated: bool,
    pub is_system: bool,
    pub unit: Option<&'static str>,
    pub kind: ValueKind,
}

const fn text(field: Field, name: &'static str, aliases: &'static [&'static str]) -> FieldDescriptor {
    FieldDescriptor {
        field,
        name,
        aliases,
        is_calculated: false,
        is_system: false,
        unit: None,
        kind: ValueKind::Text,
    }
}

const fn numeric(
    field: Field,
    name: &'static str,
    aliases: &'static [&'static str],
    unit: Option<&'static str>,
) -> FieldDescriptor {
    FieldDescriptor {
        field,
        name,
        aliases,
        is_calculated: false,
        is_system: false,
        unit,
        kind: ValueKind::Numeric,
    }
}

const fn system(field: Field, name: &'static str) -> FieldDescriptor {
    FieldDescriptor {
        is_system: true,
        ..text(field, name, &[])
    }
}

const fn calculated(descriptor: FieldDescriptor) -> FieldDescriptor {
    FieldDescriptor {
        is_calculated: true,
        ..descriptor
    }
}

const fn with_unit(descriptor: FieldDescriptor, unit: &'static str) -> FieldDescriptor {
    FieldDescriptor {
        unit: Some(unit),
        ..descriptor
    }
}

/// Every field, in `Field` declaration order.
static DESCRIPTORS: [FieldDescriptor; 43] = [
    system(Field::Id, "id"),
    system(Field::CreateDate, "CreateDate"),
    system(Field::ModifiedDate, "ModifiedDate"),
    text(Field::ModelBrand, "ModelBrand", &["Brand", "Manufacturer"]),
    text(Field::ModelId, "ModelId", &["ModelNumber", "Model"]),
    text(Field::ModelName, "ModelName", &["Name", "ProductName"]),
    text(Field::ModelFamily, "ModelFamily", &["Family", "Series"]),
    numeric(Field::ModelLaunchYear, "ModelLaunchYear", &["LaunchYear", "Year", "ReleaseYear"], None),
    text(Field::ModelStatus, "ModelStatus", &["Status"]),
    text(Field::ModelAudience, "ModelAudience", &["Audience"]),
    text(Field::ModelType, "ModelType", &["Type", "DeviceType"]),
    text(Field::ModelProductLink, "ModelProductLink", &["ProductLink", "Url", "Link"]),
    text(Field::ModelIncludedPen, "ModelIncludedPen", &["IncludedPen", "Pen"]),
    calculated(numeric(Field::ModelAge, "ModelAge", &["Age"], Some("years"))),
    with_unit(text(Field::PhysicalDimensions, "PhysicalDimensions", &["Dimensions", "DeviceDimensions"]), "mm"),
    numeric(Field::PhysicalWeight, "PhysicalWeight", &["Weight"], Some("g")),
    numeric(Field::PhysicalWeightWithStand, "PhysicalWeightWithStand", &["WeightWithStand"], Some("g")),
    with_unit(text(Field::DigitizerDimensions, "DigitizerDimensions", &["ActiveArea", "DigitizerActiveArea"]), "mm"),
    calculated(numeric(Field::DigitizerDiagonal, "DigitizerDiagonal", &["ActiveAreaDiagonal"], Some("mm"))),
    calculated(numeric(Field::DigitizerArea, "DigitizerArea", &["ActiveAreaSize"], Some("mm²"))),
    calculated(text(Field::DigitizerAspectRatio, "DigitizerAspectRatio", &["AspectRatio"])),
    numeric(Field::DigitizerPressureLevels, "DigitizerPressureLevels", &["PressureLevels", "Pressure"], None),
    numeric(Field::DigitizerReportRate, "DigitizerReportRate", &["ReportRate"], Some("RPS")),
    numeric(Field::DigitizerResolution, "DigitizerResolution", &["Resolution", "Lpmm"], Some("lpmm")),
    text(Field::DigitizerPenTechnology, "DigitizerPenTechnology", &["PenTechnology", "PenTech"]),
    numeric(Field::DigitizerTilt, "DigitizerTilt", &["Tilt", "TiltRange"], Some("°")),
    numeric(Field::DigitizerMaxHover, "DigitizerMaxHover", &["MaxHover", "HoverDistance"], Some("mm")),
    numeric(Field::DigitizerAccuracyCenter, "DigitizerAccuracyCenter", &["AccuracyCenter"], Some("mm")),
    numeric(Field::DigitizerAccuracyCorner, "DigitizerAccuracyCorner", &["AccuracyCorner"], Some("mm")),
    text(Field::DigitizerSupportsTouch, "DigitizerSupportsTouch", &["SupportsTouch", "Touch"]),
    text(Field::DisplayResolution, "DisplayResolution", &["ScreenResolution"]),
    numeric(Field::DisplaySize, "DisplaySize", &["ScreenSize"], Some("in")),
    calculated(numeric(Field::DisplayPixelDensity, "DisplayPixelDensity", &["PixelDensity", "Ppi"], Some("PPI"))),
    numeric(Field::DisplayRefreshRate, "DisplayRefreshRate", &["RefreshRate"], Some("Hz")),
    numeric(Field::DisplayResponseTime, "DisplayResponseTime", &["ResponseTime"], Some("ms")),
    numeric(Field::DisplayBrightness, "DisplayBrightness", &["Brightness"], Some("cd/m²")),
    numeric(Field::DisplayContrast, "DisplayContrast", &["Contrast", "ContrastRatio"], None),
    text(Field::DisplayColorGamut, "DisplayColorGamut", &["ColorGamut"]),
    numeric(Field::DisplayColorBitDepth, "DisplayColorBitDepth", &["ColorBitDepth", "BitDepth"], Some("bit")),
    text(Field::DisplayViewingAngle, "DisplayViewingAngle", &["ViewingAngle", "ViewingAngles"]),
    text(Field::DisplayPanelTech, "DisplayPanelTech", &["PanelTech", "PanelTechnology"]),
    text(Field::DisplayAntiGlare, "DisplayAntiGlare", &["AntiGlare"]),
    text(Field::DisplayLamination, "DisplayLamination", &["Lamination", "Laminated"]),
];

// =============================================================================
// Registry
// =============================================================================

/// Name-resolution index over the descriptor table
#[derive(Debug)]
pub struct FieldRegistry {
    descriptors: &'static [FieldDescriptor],
    /// canonical, alias and system-prefixed names -> field
    by_name: HashMap<String, Field>,
}

/// Shared registry built from the static descriptor table
pub fn registry() -> &'static FieldRegistry {
    static REGISTRY: OnceLock<FieldRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| FieldRegistry::new(&DESCRIPTORS))
}

impl FieldRegistry {
    fn new(descriptors: &'static [FieldDescriptor]) -> Self {
        let mut by_name = HashMap::new();

        // Canonical names first so they always win over an alias spelled the
        // same way; `validate` reports that situation as a conflict.
        for descriptor in descriptors {
            by_name.insert(descriptor.name.to_string(), descriptor.field);
            if descriptor.is_system {
                by_name.insert(format!("{}{}", SYSTEM_PREFIX, descriptor.name), descriptor.field);
            }
        }
        for descriptor in descriptors {
            for alias in descriptor.aliases {
                by_name.entry(alias.to_string()).or_insert(descriptor.field);
            }
        }

        Self { descriptors, by_name }
    }

    /// Descriptors in registry order
    pub fn descriptors(&self) -> &'static [FieldDescriptor] {
        self.descriptors
    }

    /// Look up a descriptor by canonical name only
    pub fn get(&self, canonical: &str) -> Option<&'static FieldDescriptor> {
        self.descriptors.iter().find(|d| d.name == canonical)
    }

    /// Resolve a canonical, legacy or system-prefixed name to its field
    pub fn resolve(&self, name: &str) -> Option<Field> {
        self.by_name.get(name).copied()
    }

    /// Check the table for duplicate canonical names and overlapping aliases.
    ///
    /// Returns one message per conflict; an empty list means the table is
    /// well formed.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut owners: HashMap<&str, &str> = HashMap::new();

        for (position, descriptor) in self.descriptors.iter().enumerate() {
            if descriptor.field.ordinal() != position {
                problems.push(format!(
                    "'{}' is declared at position {} but its field ordinal is {}",
                    descriptor.name,
                    position,
                    descriptor.field.ordinal()
                ));
            }

            let names = std::iter::once(descriptor.name).chain(descriptor.aliases.iter().copied());
            for name in names {
                if let Some(owner) = owners.insert(name, descriptor.name) {
                    problems.push(format!(
                        "name '{}' is claimed by both '{}' and '{}'",
                        name, owner, descriptor.name
                    ));
                }
            }
        }

        problems
    }
}
