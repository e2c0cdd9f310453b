//! The conformance scenario catalog
//!
//! Scenarios assume the service's seed data: at least two todos and two
//! categories, at least one project, and id `1` present for every kind.
//! Everything else a scenario needs it creates itself and leaves to the
//! cleanup ledger.

mod case;
mod crud;
mod fixtures;

pub mod categories;
pub mod content;
pub mod headers;
pub mod malformed;
pub mod projects;
pub mod relations;
pub mod replace;
pub mod todos;

use graphcheck_runner::Scenario;

/// Every scenario, grouped by module. The runner decides the order.
pub fn catalog() -> Vec<Box<dyn Scenario>> {
    let mut scenarios = Vec::new();
    scenarios.extend(todos::scenarios());
    scenarios.extend(categories::scenarios());
    scenarios.extend(projects::scenarios());
    scenarios.extend(content::scenarios());
    scenarios.extend(malformed::scenarios());
    scenarios.extend(relations::scenarios());
    scenarios.extend(replace::scenarios());
    scenarios.extend(headers::scenarios());
    tracing::debug!("Catalog holds {} scenarios", scenarios.len());
    scenarios
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphcheck_http::{HttpConfig, RestClient};
    use graphcheck_runner::{Conformance, ScenarioContext};
    use std::collections::HashSet;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_names_are_unique() {
        let catalog = catalog();
        let names: HashSet<&str> = catalog.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn test_documented_scenarios_have_observed_partners() {
        let catalog = catalog();
        let names: HashSet<&str> = catalog.iter().map(|s| s.name()).collect();
        let documented: Vec<&str> = catalog
            .iter()
            .filter(|s| s.conformance() == Conformance::Documented)
            .map(|s| s.name())
            .collect();
        assert_eq!(documented.len(), 3);

        for name in documented {
            let partner = match name.strip_suffix("_documented") {
                Some(stem) if names.contains(stem) => stem.to_string(),
                Some(stem) => format!("{}_observed", stem),
                None => panic!("{} lacks the _documented suffix", name),
            };
            assert!(names.contains(partner.as_str()), "{} has no partner", name);
        }
    }

    #[test]
    fn test_every_kind_gets_crud_and_head_coverage() {
        let catalog = catalog();
        for collection in ["todos", "categories", "projects"] {
            for check in ["create_json", "create_xml", "delete_twice", "put_missing"] {
                let name = format!("{}_{}", collection, check);
                assert!(catalog.iter().any(|s| s.name() == name), "missing {}", name);
            }
            let heads = catalog
                .iter()
                .filter(|s| s.name().starts_with(&format!("headers_{}", collection)))
                .count();
            assert_eq!(heads, 4, "HEAD coverage for {}", collection);
        }
    }

    #[tokio::test]
    async fn test_projects_fixture_scenario_against_stub() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories/1/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"projects":[]}"#))
            .mount(&server)
            .await;

        let client = Arc::new(RestClient::new(HttpConfig::with_endpoint(server.uri())).unwrap());
        let scenario = catalog()
            .into_iter()
            .find(|s| s.name() == "categories_seed_projects_empty")
            .unwrap();
        let mut ctx = ScenarioContext::new(client);
        scenario.run(&mut ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_json_detects_extra_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(201).set_body_string(
                r#"{"id":"9","title":"Errands","description":"weekend chores","todos":[]}"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/categories/9"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = Arc::new(RestClient::new(HttpConfig::with_endpoint(server.uri())).unwrap());
        let scenario = catalog()
            .into_iter()
            .find(|s| s.name() == "categories_create_json")
            .unwrap();
        let mut ctx = ScenarioContext::new(client);
        let err = scenario.run(&mut ctx).await.unwrap_err();
        assert!(err.to_string().contains("expected 3 fields, got 4"), "{}", err);
        assert!(ctx.drain_cleanup().await.is_empty());
    }
}
