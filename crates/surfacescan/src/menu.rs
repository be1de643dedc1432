//! Menu catalog: the items a tap can place.
//!
//! Catalog JSON follows the `surfacescan.menu.v1` schema. Each item carries
//! a simple placeholder model (box, sphere, cylinder) or a mesh URI, plus the
//! uniform scale applied when it is placed.

use std::collections::HashSet;
use std::path::Path;

const MENU_SCHEMA_V1: &str = "surfacescan.menu.v1";

const DEFAULT_NAME: &str = "house_menu";

/// Placeholder geometry or mesh reference for a menu item.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelKind {
    Box { size: [f64; 3] },
    Sphere { radius: f64 },
    Cylinder { radius: f64, height: f64 },
    /// External mesh file, loaded by the renderer.
    Mesh { uri: String },
}

/// One dish or drink.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: u32,
    #[serde(default)]
    pub category: String,
    pub model: ModelKind,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct MenuSpecV1 {
    schema: String,
    name: String,
    items: Vec<MenuItem>,
}

/// Validated menu.
#[derive(Debug, Clone)]
pub struct MenuCatalog {
    pub name: String,
    items: Vec<MenuItem>,
}

impl MenuCatalog {
    /// Load a catalog from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let spec: MenuSpecV1 = serde_json::from_str(data)?;
        Self::from_spec(spec).map_err(Into::into)
    }

    fn from_spec(spec: MenuSpecV1) -> Result<Self, String> {
        if spec.schema != MENU_SCHEMA_V1 {
            return Err(format!(
                "unsupported menu schema '{}' (expected '{}')",
                spec.schema, MENU_SCHEMA_V1
            ));
        }
        validate_items(&spec.items)?;
        Ok(Self {
            name: spec.name,
            items: spec.items,
        })
    }

    /// Serialize back to the `surfacescan.menu.v1` schema.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&MenuSpecV1 {
            schema: MENU_SCHEMA_V1.to_string(),
            name: self.name.clone(),
            items: self.items.clone(),
        })
    }

    pub fn get(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .map(|item| item.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }
}

impl Default for MenuCatalog {
    fn default() -> Self {
        let spec = MenuSpecV1 {
            schema: MENU_SCHEMA_V1.to_string(),
            name: DEFAULT_NAME.to_string(),
            items: default_items(),
        };
        Self::from_spec(spec).expect("default menu must be valid")
    }
}

fn default_items() -> Vec<MenuItem> {
    let item = |id: &str,
                name: &str,
                description: &str,
                price_cents: u32,
                category: &str,
                model: ModelKind| {
        MenuItem {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price_cents,
            category: category.to_string(),
            model,
            scale: 1.0,
        }
    };
    vec![
        item(
            "classic-burger",
            "Classic Burger",
            "Beef patty, cheddar, pickles, brioche bun",
            1250,
            "mains",
            ModelKind::Cylinder {
                radius: 0.06,
                height: 0.08,
            },
        ),
        item(
            "margherita-pizza",
            "Margherita Pizza",
            "Tomato, mozzarella, basil",
            1400,
            "mains",
            ModelKind::Cylinder {
                radius: 0.15,
                height: 0.02,
            },
        ),
        item(
            "caesar-salad",
            "Caesar Salad",
            "Romaine, parmesan, croutons",
            950,
            "starters",
            ModelKind::Sphere { radius: 0.08 },
        ),
        item(
            "chocolate-cake",
            "Chocolate Cake",
            "Dark chocolate layer cake",
            750,
            "desserts",
            ModelKind::Box {
                size: [0.1, 0.08, 0.1],
            },
        ),
        item(
            "house-lemonade",
            "House Lemonade",
            "Fresh lemons, mint",
            450,
            "drinks",
            ModelKind::Cylinder {
                radius: 0.035,
                height: 0.14,
            },
        ),
    ]
}

fn validate_items(items: &[MenuItem]) -> Result<(), String> {
    let mut ids = HashSet::new();
    for item in items {
        if item.id.trim().is_empty() {
            return Err("menu item id must not be empty".to_string());
        }
        if item.name.trim().is_empty() {
            return Err(format!("menu item '{}' has an empty name", item.id));
        }
        if !ids.insert(item.id.as_str()) {
            return Err(format!("duplicate menu item id '{}'", item.id));
        }
        if !item.scale.is_finite() || item.scale <= 0.0 {
            return Err(format!("menu item '{}' scale must be finite and > 0", item.id));
        }
        validate_model(&item.id, &item.model)?;
    }
    Ok(())
}

fn validate_model(id: &str, model: &ModelKind) -> Result<(), String> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    let ok = match model {
        ModelKind::Box { size } => size.iter().all(|&v| positive(v)),
        ModelKind::Sphere { radius } => positive(*radius),
        ModelKind::Cylinder { radius, height } => positive(*radius) && positive(*height),
        ModelKind::Mesh { uri } => !uri.trim().is_empty(),
    };
    if ok {
        Ok(())
    } else {
        Err(format!("menu item '{}' has an invalid model", id))
    }
}
