use crate::error::{Error, Result};

/// Products collected when the configuration does not override the list.
pub const DEFAULT_PRODUCTS: &[&str] = &["bloxone-ddi", "infoblox-nios", "bloxone-threat-defense"];

/// Ordered allow-list of product identifiers a run may target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCatalog {
    products: Vec<String>,
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_PRODUCTS.iter().map(|p| p.to_string()))
    }
}

impl ProductCatalog {
    pub fn new(products: impl IntoIterator<Item = String>) -> Self {
        Self {
            products: products.into_iter().collect(),
        }
    }

    pub fn contains(&self, product: &str) -> bool {
        self.products.iter().any(|p| p == product)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(String::as_str)
    }

    /// Products a run should visit: the requested one if it is known, or the
    /// whole catalog in declared order when nothing was requested.
    pub fn resolve(&self, requested: Option<&str>) -> Result<Vec<String>> {
        match requested.filter(|p| !p.is_empty()) {
            None => Ok(self.products.clone()),
            Some(product) if self.contains(product) => Ok(vec![product.to_string()]),
            Some(product) => Err(Error::InvalidProduct {
                product: product.to_string(),
                allowed: self.products.clone(),
            }),
        }
    }
}
