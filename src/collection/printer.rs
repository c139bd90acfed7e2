use super::model::Collection;
use crate::history::printer::table_color;
use crate::settings::StyleTokens;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Table};

pub fn collections_table(collections: &[Collection]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Name", "Description", "APIs"]);

    for collection in collections {
        table.add_row(vec![
            Cell::new(collection.id),
            Cell::new(&collection.name).add_attribute(Attribute::Bold),
            Cell::new(&collection.description).add_attribute(Attribute::Dim),
            Cell::new(collection.requests.len()),
        ]);
    }

    table
}

pub fn requests_table(collection: &Collection, tokens: &StyleTokens) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Name", "Method", "URL", "Saved"]);

    for saved in &collection.requests {
        table.add_row(vec![
            Cell::new(saved.id),
            Cell::new(&saved.name),
            Cell::new(saved.request.method).fg(table_color(tokens.accent)),
            Cell::new(&saved.request.url).add_attribute(Attribute::Dim),
            Cell::new(saved.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::model::SavedRequest;
    use crate::http::{Method, RequestModel};
    use crate::settings::Theme;

    #[test]
    fn test_tables_render_rows() {
        let mut collection = Collection::new("Team", "shared");
        collection.requests.push(SavedRequest::new(
            "users",
            &RequestModel::new(Method::Get, "https://example.test/users"),
        ));

        let listing = collections_table(std::slice::from_ref(&collection)).to_string();
        assert!(listing.contains("Team"));
        assert!(listing.contains("shared"));

        let detail = requests_table(&collection, &Theme::Dark.tokens()).to_string();
        assert!(detail.contains("users"));
        assert!(detail.contains("GET"));
    }
}
