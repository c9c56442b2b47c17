//! Derives the visible part of the catalog from a visitor's session.

use crate::models::{DocumentRecord, SessionState};

/// What the catalog page should render.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogView {
    /// Internal section selected without passing the gate.
    Locked,
    /// Nothing matches; render the explicit empty state.
    Empty,
    Documents(Vec<DocumentRecord>),
}

/// Records whose section equals the selected section, whose category matches
/// the selected category, and whose title or description contains the search
/// term case-insensitively. Input order is preserved.
pub fn visible_documents(catalog: &[DocumentRecord], session: &SessionState) -> Vec<DocumentRecord> {
    let needle = session.search_term().to_lowercase();
    let section = session.selected_section();
    let category = session.selected_category();

    catalog
        .iter()
        .filter(|doc| doc.section == section)
        .filter(|doc| category.matches(doc.category))
        .filter(|doc| {
            needle.is_empty()
                || doc.title.to_lowercase().contains(&needle)
                || doc.description.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

pub fn catalog_view(catalog: &[DocumentRecord], session: &SessionState) -> CatalogView {
    if !session.can_view(session.selected_section()) {
        return CatalogView::Locked;
    }

    let documents = visible_documents(catalog, session);
    if documents.is_empty() {
        CatalogView::Empty
    } else {
        CatalogView::Documents(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CategoryFilter, DocumentFields, FileType, Section};
    use chrono::Utc;

    fn record(id: &str, title: &str, description: &str, category: Category, section: Section) -> DocumentRecord {
        DocumentRecord::with_id(
            id.to_string(),
            DocumentFields {
                title: title.to_string(),
                description: description.to_string(),
                category,
                file_type: FileType::Pdf,
                section,
                thumbnail_url: None,
                download_url: format!("https://files.example/{}", id),
            },
            Utc::now(),
        )
    }

    fn sample_catalog() -> Vec<DocumentRecord> {
        vec![
            record("1", "Budget Planning", "Template dan panduan", Category::Data, Section::Internal),
            record("2", "Tutorial Excel", "Fungsi advanced", Category::Memo, Section::Eksternal),
        ]
    }

    fn ids(docs: &[DocumentRecord]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    fn wide_catalog() -> Vec<DocumentRecord> {
        vec![
            record("a", "Regulasi MBG 2025", "Keputusan Kepala BGN", Category::Panduan, Section::Eksternal),
            record("b", "Buku Saku Kredit", "Business Banking Division", Category::Panduan, Section::Internal),
            record("c", "Infografis Tren", "Visualisasi tren industri", Category::Memo, Section::Eksternal),
            record("d", "Budget 2026", "Perencanaan BUDGET tahunan", Category::Data, Section::Eksternal),
            record("e", "Presentasi Kredit", "Wholesale Credit Risk", Category::Panduan, Section::Internal),
        ]
    }

    #[test]
    fn eksternal_scenario_returns_only_public_record() {
        let session = SessionState::default();
        assert_eq!(ids(&visible_documents(&sample_catalog(), &session)), vec!["2"]);
    }

    #[test]
    fn internal_scenario_filters_by_category_and_search() {
        let mut session = SessionState::default();
        session.select_section(Section::Internal);
        session.unlock_internal();
        session.select_category(CategoryFilter::Data);
        session.set_search_term("budget");

        assert_eq!(ids(&visible_documents(&sample_catalog(), &session)), vec!["1"]);
    }

    #[test]
    fn all_and_empty_search_return_exactly_the_section() {
        let catalog = wide_catalog();
        for section in Section::ALL {
            let mut session = SessionState::default();
            session.select_section(section);

            let visible = visible_documents(&catalog, &session);
            let expected: Vec<_> = catalog.iter().filter(|d| d.section == section).cloned().collect();
            assert_eq!(visible, expected);
        }
    }

    #[test]
    fn search_matches_title_or_description_case_insensitively() {
        let catalog = wide_catalog();
        for term in ["budget", "KREDIT", "tren", "bgn", "zzz", ""] {
            for section in Section::ALL {
                let mut session = SessionState::default();
                session.select_section(section);
                session.set_search_term(term);

                let visible = visible_documents(&catalog, &session);
                let needle = term.to_lowercase();
                let expected: Vec<_> = catalog
                    .iter()
                    .filter(|d| d.section == section)
                    .filter(|d| {
                        d.title.to_lowercase().contains(&needle)
                            || d.description.to_lowercase().contains(&needle)
                    })
                    .cloned()
                    .collect();
                assert_eq!(visible, expected, "term {term:?} in {section}");
            }
        }
    }

    #[test]
    fn filtering_preserves_input_order() {
        let mut session = SessionState::default();
        session.select_category(CategoryFilter::All);
        let visible = visible_documents(&wide_catalog(), &session);
        assert_eq!(ids(&visible), vec!["a", "c", "d"]);
    }

    #[test]
    fn locked_internal_section_is_not_rendered() {
        let mut session = SessionState::default();
        session.select_section(Section::Internal);
        assert_eq!(catalog_view(&sample_catalog(), &session), CatalogView::Locked);

        session.unlock_internal();
        assert!(matches!(catalog_view(&sample_catalog(), &session), CatalogView::Documents(_)));
    }

    #[test]
    fn no_match_yields_empty_state() {
        let mut session = SessionState::default();
        session.set_search_term("tidak ada");
        assert_eq!(catalog_view(&sample_catalog(), &session), CatalogView::Empty);
    }
}
