//! The fixed list of RIT elements shown by the viewer.
//!
//! Every entry drives both the side menu and the placement of its 3D
//! representation. Entries are static and keyed by [`RitId`].

use std::fmt;

use bevy::prelude::*;

pub struct CatalogPlugin;

impl Plugin for CatalogPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Catalog::rit())
            .add_systems(PreStartup, validate_catalog);
    }
}

/// Identifier of a RIT element (the number shown in badges and labels).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RitId(pub u8);

impl fmt::Display for RitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network segment an element belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Street side, outside the property line.
    External,
    /// Link duct, technical rooms and the vertical shaft.
    Trunk,
    /// Per-floor distribution boxes.
    Distribution,
    /// Horizontal run from the shaft to each apartment.
    Lateral,
    /// Wiring inside the apartment.
    Internal,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::External => "Red externa",
            Category::Trunk => "Red troncal",
            Category::Distribution => "Distribución",
            Category::Lateral => "Red lateral",
            Category::Internal => "Red interior",
        }
    }
}

#[derive(Clone, Debug)]
pub struct RitEntry {
    pub id: RitId,
    pub name: &'static str,
    pub description: &'static str,
    pub position: Vec3,
    /// sRGB colour as `0xRRGGBB`.
    pub color_hint: u32,
    pub category: Category,
}

impl RitEntry {
    pub fn color(&self) -> Color {
        let [_, r, g, b] = self.color_hint.to_be_bytes();
        Color::srgb_u8(r, g, b)
    }

    /// Short description used by the side menu.
    pub fn snippet(&self) -> String {
        const SNIPPET_CHARS: usize = 60;
        let head: String = self.description.chars().take(SNIPPET_CHARS).collect();
        format!("{head}...")
    }
}

const RIT_ENTRIES: &[RitEntry] = &[
    RitEntry {
        id: RitId(1),
        name: "Cámara de acceso",
        description: "Ubicada en BNUP (Bien Nacional de Uso Público). Punto de entrada de los proveedores externos de telecomunicaciones al predio.",
        position: Vec3::new(18.0, -1.5, 0.0),
        color_hint: 0x6c757d,
        category: Category::External,
    },
    RitEntry {
        id: RitId(2),
        name: "Canalización externa",
        description: "Tubería subterránea que transporta los cables desde la calle hasta el límite del predio del condominio.",
        position: Vec3::new(14.0, -1.5, 0.0),
        color_hint: 0xff4d00,
        category: Category::External,
    },
    RitEntry {
        id: RitId(3),
        name: "Cámara de paso",
        description: "Punto de registro y tiro al ingreso del condominio. Permite acceso para mantenimiento y empalmes.",
        position: Vec3::new(8.0, -1.5, 0.0),
        color_hint: 0x6c757d,
        category: Category::External,
    },
    RitEntry {
        id: RitId(4),
        name: "Canalización de enlace",
        description: "Ducto principal que conecta la entrada externa con las salas técnicas SOTI/SOTS del edificio.",
        position: Vec3::new(4.0, -1.2, 0.0),
        color_hint: 0xff4d00,
        category: Category::Trunk,
    },
    RitEntry {
        id: RitId(5),
        name: "Sala SOTI / SOTS",
        description: "Salas de Operaciones de Telecomunicaciones. SOTI ubicada en sótano, SOTS en azotea. Centro neurálgico de la RIT.",
        position: Vec3::new(0.0, -1.05, 0.0),
        color_hint: 0xff4d00,
        category: Category::Trunk,
    },
    RitEntry {
        id: RitId(6),
        name: "Canalización troncal",
        description: "Shaft vertical que recorre todos los pisos del edificio. Es la columna vertebral de toda la RIT.",
        position: Vec3::new(0.0, 8.0, 0.0),
        color_hint: 0xff4d00,
        category: Category::Trunk,
    },
    RitEntry {
        id: RitId(7),
        name: "Cajas de distribución (BUDI)",
        description: "Building Distribution Box. Punto de derivación en cada piso para conexión hacia los departamentos.",
        position: Vec3::new(0.8, 7.0, 1.2),
        color_hint: 0x6c757d,
        category: Category::Distribution,
    },
    RitEntry {
        id: RitId(8),
        name: "Captación de señal",
        description: "Antenas satelitales y sistemas de recepción ubicados en la azotea del edificio.",
        position: Vec3::new(0.0, 16.0, 0.0),
        color_hint: 0xffffff,
        category: Category::Trunk,
    },
    RitEntry {
        id: RitId(9),
        name: "Canalización lateral",
        description: "Tubería horizontal que va desde el shaft troncal hasta la CTR de cada departamento.",
        position: Vec3::new(2.5, 7.0, 1.0),
        color_hint: 0x00b4d8,
        category: Category::Lateral,
    },
    RitEntry {
        id: RitId(10),
        name: "Caja Terminación (CTR)",
        description: "Caja terminal domiciliaria con 2 pelos de fibra óptica. Se ubica generalmente sobre la puerta interior del departamento.",
        position: Vec3::new(4.8, 7.5, 1.0),
        color_hint: 0xffffff,
        category: Category::Lateral,
    },
    RitEntry {
        id: RitId(11),
        name: "Canalización interna",
        description: "Ductos dentro de los muros del hogar que llevan la fibra hacia los distintos puntos de servicio.",
        position: Vec3::new(6.15, 7.0, 2.0),
        color_hint: 0x00b4d8,
        category: Category::Internal,
    },
    RitEntry {
        id: RitId(12),
        name: "Tomas de usuario",
        description: "Rosetas finales donde el usuario conecta sus equipos de TV, Internet y Telefonía.",
        position: Vec3::new(7.5, 6.5, 3.0),
        color_hint: 0xffc107,
        category: Category::Internal,
    },
];

/// Read-only registry of RIT entries, in menu order.
#[derive(Resource, Clone, Debug)]
pub struct Catalog {
    entries: &'static [RitEntry],
}

impl Catalog {
    /// The building's RIT as presented by the viewer.
    pub fn rit() -> Self {
        Self {
            entries: RIT_ENTRIES,
        }
    }

    pub fn entries(&self) -> &'static [RitEntry] {
        self.entries
    }

    pub fn get(&self, id: RitId) -> Option<&'static RitEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|other| other.id == entry.id) {
                return Err(CatalogError::DuplicateId(entry.id));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Empty,
    DuplicateId(RitId),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Empty => write!(f, "RIT catalog has no entries"),
            CatalogError::DuplicateId(id) => write!(f, "RIT catalog repeats id {id}"),
        }
    }
}

impl std::error::Error for CatalogError {}

fn validate_catalog(catalog: Res<Catalog>, mut exit: EventWriter<AppExit>) {
    match catalog.validate() {
        Ok(()) => info!("RIT catalog loaded with {} entries", catalog.len()),
        Err(err) => {
            error!("Cannot start viewer: {err}");
            exit.send(AppExit::error());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rit_catalog_is_valid() {
        let catalog = Catalog::rit();
        assert_eq!(catalog.validate(), Ok(()));
        assert_eq!(catalog.len(), 12);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        static DUPES: &[RitEntry] = &[
            RitEntry {
                id: RitId(3),
                name: "a",
                description: "",
                position: Vec3::ZERO,
                color_hint: 0,
                category: Category::External,
            },
            RitEntry {
                id: RitId(3),
                name: "b",
                description: "",
                position: Vec3::ZERO,
                color_hint: 0,
                category: Category::External,
            },
        ];
        let catalog = Catalog { entries: DUPES };
        assert_eq!(catalog.validate(), Err(CatalogError::DuplicateId(RitId(3))));
        assert_eq!(Catalog { entries: &[] }.validate(), Err(CatalogError::Empty));
    }

    #[test]
    fn lookup_by_id() {
        let catalog = Catalog::rit();
        let shaft = catalog.get(RitId(6)).unwrap();
        assert_eq!(shaft.name, "Canalización troncal");
        assert_eq!(shaft.category, Category::Trunk);
        assert!(catalog.get(RitId(42)).is_none());
    }

    #[test]
    fn snippet_truncates_on_char_boundaries() {
        let catalog = Catalog::rit();
        for entry in catalog.entries() {
            let snippet = entry.snippet();
            assert!(snippet.ends_with("..."));
            assert!(snippet.chars().count() <= 63);
        }
    }
}
