//! Purchase and ingredient-safety lookup links for products.

use crate::types::{RecommendedProduct, SearchResult};

const AMAZON_SEARCH_URL: &str = "https://www.amazon.com/s?k=";
const EWG_SEARCH_URL: &str = "https://www.ewg.org/skindeep/search/?search=";

/// Amazon search for `"{brand} {name}"`.
pub fn amazon_search_url(brand: Option<&str>, product_name: &str) -> String {
    let query = format!("{} {}", brand.unwrap_or(""), product_name);
    format!("{}{}", AMAZON_SEARCH_URL, urlencoding::encode(query.trim()))
}

/// Direct EWG Skin Deep page when known, else a search by product name.
pub fn ewg_lookup_url(ewg_url: Option<&str>, product_name: &str) -> String {
    match ewg_url.filter(|u| !u.trim().is_empty()) {
        Some(url) => url.to_string(),
        None => format!("{}{}", EWG_SEARCH_URL, urlencoding::encode(product_name)),
    }
}

impl SearchResult {
    /// Purchase link: the product's own Amazon URL, else a search.
    pub fn buy_url(&self) -> String {
        match self.metadata_str("amazon_url") {
            Some(url) => url.to_string(),
            None => amazon_search_url(self.metadata_str("brand"), self.display_name()),
        }
    }

    pub fn lookup_url(&self) -> String {
        ewg_lookup_url(self.metadata_str("ewg_url"), self.display_name())
    }
}

impl RecommendedProduct {
    /// Purchase link: the product's own Amazon URL, else a search.
    pub fn buy_url(&self) -> String {
        match self.amazon_url() {
            Some(url) => url.to_string(),
            None => amazon_search_url(self.brand(), &self.name),
        }
    }

    pub fn lookup_url(&self) -> String {
        ewg_lookup_url(self.ewg_url(), &self.name)
    }
}
