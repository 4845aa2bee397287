//! Product and category normalization.

use serde_json::Value;

use mercadito_core::{Category, CategoryId, Product, ProductId};

use crate::resolve::{resolve_decimal, resolve_id, resolve_string};

/// Candidate key paths for the product id.
const ID_CANDIDATES: &[&str] = &["id_producto", "id", "idProducto", "productId"];
/// Candidate key paths for the product name.
const NAME_CANDIDATES: &[&str] = &["nombre", "nombreProducto", "name"];
/// Candidate key paths for the unit price.
const PRICE_CANDIDATES: &[&str] = &["precio", "price"];
/// Candidate key paths for the description.
const DESCRIPTION_CANDIDATES: &[&str] = &["descripcion", "description"];
/// Candidate key paths for the category display name.
const CATEGORY_CANDIDATES: &[&str] = &["nombreCategoria", "categoria", "category"];
/// Candidate key paths for the brand display name.
const BRAND_CANDIDATES: &[&str] = &["nombreMarca", "marca", "brand"];
/// Candidate key paths for the image URL.
const IMAGE_CANDIDATES: &[&str] = &["urlImagen", "imagen", "imageUrl", "image"];

/// Normalize one raw catalog record into a [`Product`].
///
/// Returns `None` when no id candidate resolves; everything else degrades
/// to a type-correct default, so the output never carries a null.
#[must_use]
pub fn normalize_product(raw: &Value) -> Option<Product> {
    let id = resolve_id(Some(raw), ID_CANDIDATES)?;

    Some(Product {
        id: ProductId::new(id),
        name: resolve_string(Some(raw), NAME_CANDIDATES),
        price: resolve_decimal(Some(raw), PRICE_CANDIDATES),
        description: resolve_string(Some(raw), DESCRIPTION_CANDIDATES),
        category: resolve_string(Some(raw), CATEGORY_CANDIDATES),
        brand: resolve_string(Some(raw), BRAND_CANDIDATES),
        image_url: resolve_string(Some(raw), IMAGE_CANDIDATES),
    })
}

/// Normalize a catalog listing response.
///
/// Accepts a bare array or an object wrapping one under
/// `products`/`items`/`data`. Records without any id candidate are
/// skipped; anything non-array normalizes to an empty list.
#[must_use]
pub fn normalize_product_list(raw: &Value) -> Vec<Product> {
    locate_array(raw, &["products", "items", "data"]).map_or_else(Vec::new, |items| {
        items.iter().filter_map(normalize_product).collect()
    })
}

/// Normalize a category listing response.
///
/// Duplicates pass through unchanged: the dedicated endpoint is trusted
/// as-is, and the deduplicating fallback lives in [`derive_categories`].
#[must_use]
pub fn normalize_category_list(raw: &Value) -> Vec<Category> {
    locate_array(raw, &["categories", "items", "data"]).map_or_else(Vec::new, |items| {
        items
            .iter()
            .filter_map(|item| {
                let id = resolve_id(Some(item), &["id", "idCategoria", "categoriaId"])?;
                Some(Category {
                    id: CategoryId::new(id),
                    name: resolve_string(Some(item), &["nombre", "nombreCategoria", "name"]),
                })
            })
            .collect()
    })
}

/// Derive category names from a product list.
///
/// Used when the category endpoint fails or returns nothing: sorted,
/// unique, non-empty category names taken from the products themselves.
#[must_use]
pub fn derive_categories(products: &[Product]) -> Vec<String> {
    let mut names: Vec<String> = products
        .iter()
        .map(|p| p.category.clone())
        .filter(|c| !c.is_empty())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Locate the record array in a listing response: the value itself when it
/// is an array, else the first wrapper key that holds one.
pub(crate) fn locate_array<'a>(raw: &'a Value, wrappers: &[&str]) -> Option<&'a Vec<Value>> {
    if let Some(items) = raw.as_array() {
        return Some(items);
    }
    wrappers.iter().find_map(|key| raw.get(*key)?.as_array())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn test_normalize_product_backend_shape() {
        let raw = json!({
            "id_producto": 3,
            "nombre": "Zapatilla",
            "precio": 49.9,
            "descripcion": "Running",
            "nombreCategoria": "Calzado",
            "nombreMarca": "Acme",
            "urlImagen": "http://img/3.png"
        });

        let product = normalize_product(&raw).expect("has id");
        assert_eq!(product.id.as_i64(), 3);
        assert_eq!(product.name, "Zapatilla");
        assert_eq!(product.price, Decimal::new(499, 1));
        assert_eq!(product.category, "Calzado");
        assert_eq!(product.brand, "Acme");
        assert_eq!(product.image_url, "http://img/3.png");
    }

    #[test]
    fn test_normalize_product_camel_case_shape() {
        let raw = json!({"productId": 9, "name": "Mouse", "price": "12.50"});
        let product = normalize_product(&raw).expect("has id");
        assert_eq!(product.id.as_i64(), 9);
        assert_eq!(product.name, "Mouse");
        assert_eq!(product.price, Decimal::new(1250, 2));
        assert_eq!(product.description, "");
        assert_eq!(product.category, "");
    }

    #[test]
    fn test_normalize_product_without_id_is_skipped() {
        let raw = json!({"nombre": "sin id"});
        assert!(normalize_product(&raw).is_none());
    }

    #[test]
    fn test_normalize_product_list_bare_array() {
        let raw = json!([
            {"id_producto": 1, "nombre": "A"},
            {"id_producto": 2, "nombre": "B"}
        ]);
        let products = normalize_product_list(&raw);
        assert_eq!(products.len(), 2);
    }

    #[test]
    fn test_normalize_product_list_wrapped() {
        let raw = json!({"data": [{"id": 5}]});
        let products = normalize_product_list(&raw);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id.as_i64(), 5);
    }

    #[test]
    fn test_normalize_product_list_malformed_is_empty() {
        assert!(normalize_product_list(&json!(null)).is_empty());
        assert!(normalize_product_list(&json!("texto")).is_empty());
        assert!(normalize_product_list(&json!({"other": 1})).is_empty());
    }

    #[test]
    fn test_normalize_category_list_keeps_duplicates() {
        let raw = json!([
            {"idCategoria": 1, "nombre": "Calzado"},
            {"idCategoria": 2, "nombre": "Calzado"}
        ]);
        let categories = normalize_category_list(&raw);
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, categories[1].name);
    }

    #[test]
    fn test_derive_categories_sorted_unique() {
        let products: Vec<Product> = [("b", 1), ("a", 2), ("b", 3), ("", 4)]
            .into_iter()
            .map(|(cat, id)| Product {
                id: ProductId::new(id),
                name: String::new(),
                price: Decimal::ZERO,
                description: String::new(),
                category: cat.to_string(),
                brand: String::new(),
                image_url: String::new(),
            })
            .collect();

        assert_eq!(derive_categories(&products), vec!["a", "b"]);
    }
}
