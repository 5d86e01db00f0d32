//! 목록 조회: 필터링, 정렬, 페이지네이션.
//!
//! 모든 비교는 [`Document::display_value`]가 반환하는 문자열 표현을 기준으로 합니다.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::document::Document;

/// 필터에서 제외되는 예약 키.
pub const SORT_KEY: &str = "sort";
/// 페이지 번호 쿼리 키.
pub const PAGE_KEY: &str = "page";
/// 페이지 크기 쿼리 키.
pub const PER_PAGE_KEY: &str = "per_page";

/// 기본 페이지 크기.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// 정렬 키 하나.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

/// 목록 조회 파라미터.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// 1부터 시작하는 페이지 번호 (0 이하이면 1)
    pub page: i64,
    /// 페이지 크기 (0 이하이면 20)
    pub per_page: i64,
    /// 필드 → 정확히 일치해야 하는 값. `sort` 키는 여기 포함되지 않습니다.
    pub filters: BTreeMap<String, String>,
    /// 우선순위 순서의 정렬 키
    pub sort: Vec<SortKey>,
}

impl ListQuery {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page,
            per_page,
            ..Default::default()
        }
    }

    /// 필터 추가.
    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// 정렬 표현식 설정 (예: `department,-hire_date`).
    pub fn with_sort(mut self, expr: &str) -> Self {
        self.sort = parse_sort(expr);
        self
    }

    /// 필터 맵에서 조회 파라미터를 구성합니다.
    ///
    /// `sort` 키는 정렬로 해석되며 나머지 키는 모두 필터입니다.
    pub fn from_filter_map(page: i64, per_page: i64, filter: HashMap<String, String>) -> Self {
        let mut query = Self::new(page, per_page);
        for (key, value) in filter {
            if key == SORT_KEY {
                query.sort = parse_sort(&value);
            } else {
                query.filters.insert(key, value);
            }
        }
        query
    }

    /// HTTP 쿼리 문자열 파라미터에서 구성합니다.
    ///
    /// `page`, `per_page`는 숫자로 해석하고 (잘못된 값은 기본값),
    /// 나머지는 [`ListQuery::from_filter_map`]과 동일하게 처리합니다.
    pub fn from_query_params(mut params: HashMap<String, String>) -> Self {
        let page = params
            .remove(PAGE_KEY)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(1);
        let per_page = params
            .remove(PER_PAGE_KEY)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_PER_PAGE);
        Self::from_filter_map(page, per_page, params)
    }

    /// 정규화된 페이지 번호.
    pub fn effective_page(&self) -> i64 {
        if self.page <= 0 {
            1
        } else {
            self.page
        }
    }

    /// 정규화된 페이지 크기.
    pub fn effective_per_page(&self) -> i64 {
        if self.per_page <= 0 {
            DEFAULT_PER_PAGE
        } else {
            self.per_page
        }
    }

    /// 필터, 정렬, 페이지네이션을 순서대로 적용합니다.
    pub fn apply(&self, docs: Vec<Document>) -> Page<Document> {
        let mut matched: Vec<Document> = docs
            .into_iter()
            .filter(|doc| matches_filters(doc, &self.filters))
            .collect();
        sort_documents(&mut matched, &self.sort);
        paginate(matched, self.effective_page(), self.effective_per_page())
    }
}

/// 페이지 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 페이지네이션 이전 (필터 적용 후) 전체 개수
    pub total: usize,
    pub page: i64,
    pub per_page: i64,
}

/// 모든 필터가 일치하는지 확인 (AND).
///
/// 필터 대상 필드가 없는 문서는 제외됩니다.
pub fn matches_filters(doc: &Document, filters: &BTreeMap<String, String>) -> bool {
    filters.iter().all(|(field, expected)| {
        if field == SORT_KEY {
            return true;
        }
        match doc.get_path(field) {
            Some(value) => crate::document::display_string(value) == *expected,
            None => false,
        }
    })
}

/// 정렬 표현식 파싱. 빈 항목은 무시합니다.
pub fn parse_sort(expr: &str) -> Vec<SortKey> {
    expr.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.strip_prefix('-') {
            Some(field) if !field.is_empty() => Some(SortKey {
                field: field.to_string(),
                descending: true,
            }),
            Some(_) => None,
            None => Some(SortKey {
                field: s.to_string(),
                descending: false,
            }),
        })
        .collect()
}

/// 다중 키 정렬.
///
/// 가장 낮은 우선순위 키부터 안정 정렬을 적용하므로
/// 첫 번째 키가 최종 순서를 결정하고 동점일 때만 다음 키가 사용됩니다.
pub fn sort_documents(docs: &mut [Document], keys: &[SortKey]) {
    for key in keys.iter().rev() {
        docs.sort_by(|a, b| {
            let ord = a.display_value(&key.field).cmp(&b.display_value(&key.field));
            if key.descending {
                ord.reverse()
            } else {
                ord
            }
        });
    }
}

/// 페이지 슬라이스. 범위를 벗어난 페이지는 빈 목록과 올바른 `total`을 반환합니다.
pub fn paginate<T>(items: Vec<T>, page: i64, per_page: i64) -> Page<T> {
    let page = if page <= 0 { 1 } else { page };
    let per_page = if per_page <= 0 { DEFAULT_PER_PAGE } else { per_page };
    let total = items.len();

    let start = (page - 1).saturating_mul(per_page);
    let start = usize::try_from(start).unwrap_or(usize::MAX);
    let items = if start >= total {
        Vec::new()
    } else {
        let take = usize::try_from(per_page).unwrap_or(usize::MAX);
        items.into_iter().skip(start).take(take).collect()
    };

    Page {
        items,
        total,
        page,
        per_page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::cmp::Ordering;

    /// 정렬 키 목록 기준 사전식 비교.
    fn compare_documents(a: &Document, b: &Document, keys: &[SortKey]) -> Ordering {
        for key in keys {
            let ord = a.display_value(&key.field).cmp(&b.display_value(&key.field));
            let ord = if key.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    fn employee(id: &str, dept: &str) -> Document {
        Document::from_value(json!({"employee_id": id, "department": dept})).unwrap()
    }

    fn ids(page: &Page<Document>) -> Vec<String> {
        page.items
            .iter()
            .map(|d| d.get_str("employee_id").unwrap_or_default().to_string())
            .collect()
    }

    fn twenty_five() -> Vec<Document> {
        (0..25)
            .map(|i| {
                let dept = if i % 2 == 0 { "eng" } else { "hr" };
                employee(&format!("e{:02}", i), dept)
            })
            .collect()
    }

    #[test]
    fn test_filter_total_reflects_matches() {
        let query = ListQuery::new(1, 5).with_filter("department", "hr");
        let page = query.apply(twenty_five());

        assert_eq!(page.total, 12);
        assert_eq!(page.items.len(), 5);
        assert!(page
            .items
            .iter()
            .all(|d| d.get_str("department") == Some("hr")));
    }

    #[test]
    fn test_filter_all_hr_across_pages() {
        let query = ListQuery::new(1, 100).with_filter("department", "hr");
        let page = query.apply(twenty_five());
        assert_eq!(page.items.len(), 12);
    }

    #[test]
    fn test_sort_ascending_and_descending() {
        let docs: Vec<Document> = ["e3", "e1", "e5", "e2", "e4"]
            .iter()
            .map(|id| employee(id, "eng"))
            .collect();

        let asc = ListQuery::new(1, 10).with_sort("employee_id").apply(docs.clone());
        assert_eq!(ids(&asc), vec!["e1", "e2", "e3", "e4", "e5"]);

        let desc = ListQuery::new(1, 10).with_sort("-employee_id").apply(docs);
        assert_eq!(ids(&desc), vec!["e5", "e4", "e3", "e2", "e1"]);
    }

    #[test]
    fn test_sort_first_key_wins_ties() {
        let docs = vec![
            employee("e1", "hr"),
            employee("e2", "eng"),
            employee("e3", "hr"),
            employee("e4", "eng"),
        ];

        let page = ListQuery::new(1, 10)
            .with_sort("department,-employee_id")
            .apply(docs);

        assert_eq!(ids(&page), vec!["e4", "e2", "e3", "e1"]);
    }

    #[test]
    fn test_missing_field_excluded_by_filter() {
        let docs = vec![
            employee("e1", "hr"),
            Document::from_value(json!({"employee_id": "e2"})).unwrap(),
        ];
        let page = ListQuery::new(1, 10).with_filter("department", "hr").apply(docs);
        assert_eq!(ids(&page), vec!["e1"]);

        // 빈 문자열 필터도 필드가 존재해야 일치
        let docs = vec![Document::from_value(json!({"employee_id": "e3"})).unwrap()];
        let page = ListQuery::new(1, 10).with_filter("department", "").apply(docs);
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_filter_dot_path_and_number() {
        let docs = vec![
            Document::from_value(json!({
                "employee_id": "e1",
                "legal_name": {"first": "Ada"},
                "level": 3
            }))
            .unwrap(),
            Document::from_value(json!({
                "employee_id": "e2",
                "legal_name": {"first": "Bob"},
                "level": 3
            }))
            .unwrap(),
        ];

        let page = ListQuery::new(1, 10)
            .with_filter("legal_name.first", "Ada")
            .with_filter("level", "3")
            .apply(docs);

        assert_eq!(ids(&page), vec!["e1"]);
    }

    #[test]
    fn test_pagination_defaults_and_out_of_range() {
        let page = ListQuery::new(0, 0).apply(twenty_five());
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 20);
        assert_eq!(page.items.len(), 20);

        let page = ListQuery::new(2, 20).apply(twenty_five());
        assert_eq!(page.items.len(), 5);

        let page = ListQuery::new(9, 20).apply(twenty_five());
        assert!(page.items.is_empty());
        assert_eq!(page.total, 25);
    }

    #[test]
    fn test_from_query_params() {
        let mut params = HashMap::new();
        params.insert("page".to_string(), "2".to_string());
        params.insert("per_page".to_string(), "abc".to_string());
        params.insert("sort".to_string(), "-hire_date, employee_id".to_string());
        params.insert("department".to_string(), "hr".to_string());

        let query = ListQuery::from_query_params(params);

        assert_eq!(query.page, 2);
        assert_eq!(query.per_page, DEFAULT_PER_PAGE);
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters.get("department").map(String::as_str), Some("hr"));
        assert_eq!(
            query.sort,
            vec![
                SortKey {
                    field: "hire_date".into(),
                    descending: true
                },
                SortKey {
                    field: "employee_id".into(),
                    descending: false
                },
            ]
        );
    }

    #[test]
    fn test_parse_sort_skips_empty() {
        assert!(parse_sort("").is_empty());
        assert!(parse_sort(" , -").is_empty());
        assert_eq!(parse_sort("a,,b").len(), 2);
    }

    proptest! {
        #[test]
        fn prop_pages_partition_filtered_set(
            depts in proptest::collection::vec(0u8..3, 0..60),
            per_page in 1i64..12,
        ) {
            let docs: Vec<Document> = depts
                .iter()
                .enumerate()
                .map(|(i, d)| employee(&format!("e{:03}", i), &format!("d{}", d)))
                .collect();
            let expected = depts.iter().filter(|d| **d == 1).count();

            let mut seen = 0usize;
            let mut page_no = 1i64;
            loop {
                let page = ListQuery::new(page_no, per_page)
                    .with_filter("department", "d1")
                    .apply(docs.clone());
                prop_assert_eq!(page.total, expected);
                if page.items.is_empty() {
                    break;
                }
                seen += page.items.len();
                page_no += 1;
            }
            prop_assert_eq!(seen, expected);
        }

        #[test]
        fn prop_sorted_output_is_ordered(
            ids in proptest::collection::vec("[a-z]{1,6}", 0..40),
            descending in any::<bool>(),
        ) {
            let docs: Vec<Document> = ids.iter().map(|id| employee(id, "x")).collect();
            let expr = if descending { "-employee_id" } else { "employee_id" };
            let keys = parse_sort(expr);

            let page = ListQuery::new(1, 1000).with_sort(expr).apply(docs);

            for pair in page.items.windows(2) {
                prop_assert_ne!(
                    compare_documents(&pair[0], &pair[1], &keys),
                    Ordering::Greater
                );
            }
        }
    }
}
