//! HTTP span helpers.

use uuid::Uuid;

/// Replace identifier segments so paths group by route.
pub(super) fn route_template(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut normalised = String::from("/");

    for (index, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if index > 0 {
            normalised.push('/');
        }

        let is_id = Uuid::parse_str(segment).is_ok()
            || (!segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()));

        if is_id {
            normalised.push_str("{id}");
        } else {
            normalised.push_str(segment);
        }
    }

    normalised
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_uuid_segments_become_placeholders() {
        assert_eq!(route_template("/"), "/");
        assert_eq!(route_template("/shopping-carts/17"), "/shopping-carts/{id}");
        assert_eq!(
            route_template("/shopping-carts/0191b1f4-7c6e-7a53-9d1c-2b3f4a5e6d7c/items"),
            "/shopping-carts/{id}/items"
        );
        assert_eq!(route_template("/debug/clear-carts"), "/debug/clear-carts");
        assert_eq!(route_template("/products/12/details"), "/products/{id}/details");
        assert_eq!(route_template("/products/search"), "/products/search");
    }
}
