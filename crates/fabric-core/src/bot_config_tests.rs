//! Tests for the bot configuration module.

use super::*;

#[test]
fn test_bot_specific_config_new() {
    let config = BotSpecificConfig::new();
    assert!(config.is_empty());
}

#[test]
fn test_bot_specific_config_with_setting() {
    let config = BotSpecificConfig::new().with_setting(
        "key".to_string(),
        serde_json::Value::String("value".to_string()),
    );

    assert!(!config.is_empty());
    assert_eq!(
        config.get("key"),
        Some(&serde_json::Value::String("value".to_string()))
    );
}

#[test]
fn test_bot_configuration_settings_default() {
    let settings = BotConfigurationSettings::default();
    assert_eq!(settings.max_bots, 50);
    assert_eq!(settings.default_message_ttl, 24 * 60 * 60);
    assert!(settings.validate_on_startup);
    assert!(settings.log_configuration);
}

#[test]
fn test_queue_destination() {
    let bot_name = BotName::new("test-bot").unwrap();
    let queue_name = QueueName::new("fabric-test-bot").unwrap();
    let config = BotSpecificConfig::new();

    let destination = QueueDestination::new(bot_name, queue_name, true, config);
    assert!(destination.requires_ordering());
}

#[test]
fn test_routing_decision() {
    let event_id = EventId::new();
    let decision = RoutingDecision::new(event_id, vec![]);

    assert!(!decision.has_destinations());
    assert_eq!(decision.get_ordered_destinations().len(), 0);
    assert_eq!(decision.get_parallel_destinations().len(), 0);
}

#[test]
fn test_bot_config_error_transient() {
    let error = BotConfigError::SourceUnavailable("test".to_string());
    assert!(error.is_transient());

    let error = BotConfigError::ValidationError {
        errors: vec!["test".to_string()],
    };
    assert!(!error.is_transient());
}

#[test]
fn event_type_pattern_parses_exact_wildcard_entity_all_and_exclude() {
    assert_eq!(
        "issues.opened".parse::<EventTypePattern>().unwrap(),
        EventTypePattern::Exact("issues.opened".to_string())
    );
    assert_eq!(
        "issues.*".parse::<EventTypePattern>().unwrap(),
        EventTypePattern::Wildcard("issues.*".to_string())
    );
    assert_eq!(
        "pull_request".parse::<EventTypePattern>().unwrap(),
        EventTypePattern::EntityAll("pull_request".to_string())
    );
    assert_eq!(
        "!push".parse::<EventTypePattern>().unwrap(),
        EventTypePattern::Exclude("push".to_string())
    );
}

#[test]
fn event_type_pattern_matches_respects_pattern_kind() {
    let wildcard = EventTypePattern::Wildcard("issues.*".to_string());
    assert!(wildcard.matches("issues.opened"));
    assert!(!wildcard.matches("issues"));
    assert!(!wildcard.matches("pull_request.opened"));

    let entity_all = EventTypePattern::EntityAll("pull_request".to_string());
    assert!(entity_all.matches("pull_request"));
    assert!(entity_all.matches("pull_request.opened"));
    assert!(!entity_all.matches("pull_request_review.opened"));

    assert_eq!(wildcard.get_entity_type(), Some("issues"));
    assert_eq!(entity_all.get_entity_type(), Some("pull_request"));
}

fn make_repository(owner_login: &str, name: &str) -> Repository {
    let owner = User {
        id: UserId::new(1),
        login: owner_login.to_string(),
        user_type: UserType::User,
    };
    Repository::new(
        RepositoryId::new(1),
        name.to_string(),
        format!("{owner_login}/{name}"),
        owner,
        false,
    )
}

#[test]
fn repository_filter_exact_and_owner_and_boolean_composition() {
    let repo = make_repository("acme", "widgets");

    let exact = RepositoryFilter::Exact {
        owner: "acme".to_string(),
        name: "widgets".to_string(),
    };
    assert!(exact.matches(&repo));

    let wrong_owner = RepositoryFilter::Exact {
        owner: "other".to_string(),
        name: "widgets".to_string(),
    };
    assert!(!wrong_owner.matches(&repo));

    let owner_filter = RepositoryFilter::Owner("acme".to_string());
    assert!(owner_filter.matches(&repo));

    let any_of = RepositoryFilter::AnyOf(vec![wrong_owner.clone(), owner_filter.clone()]);
    assert!(any_of.matches(&repo));

    let all_of = RepositoryFilter::AllOf(vec![wrong_owner, owner_filter]);
    assert!(!all_of.matches(&repo));
}

#[test]
fn repository_filter_name_pattern_validates_and_matches_regex() {
    let pattern = RepositoryFilter::NamePattern("^acme/.*$".to_string());
    assert!(pattern.validate().is_ok());
    assert!(pattern.matches(&make_repository("acme", "widgets")));
    assert!(!pattern.matches(&make_repository("other", "widgets")));

    let bad_pattern = RepositoryFilter::NamePattern("(unterminated".to_string());
    assert!(bad_pattern.validate().is_err());
}

#[test]
fn bot_subscription_matches_event_honors_repository_filter_and_exclusions() {
    let repo = make_repository("acme", "widgets");
    let other_repo = make_repository("other", "widgets");

    let bot = BotSubscription {
        name: BotName::new("reviewer").unwrap(),
        queue: QueueName::new("fabric-reviewer").unwrap(),
        events: vec![
            EventTypePattern::EntityAll("pull_request".to_string()),
            EventTypePattern::Exclude("pull_request.closed".to_string()),
        ],
        ordered: false,
        repository_filter: Some(RepositoryFilter::Owner("acme".to_string())),
        config: BotSpecificConfig::new(),
    };

    let matching = EventEnvelope::new(
        "pull_request.opened".to_string(),
        Some("opened".to_string()),
        repo.clone(),
        EventEntity::PullRequest { number: 1 },
        serde_json::json!({}),
    );
    assert!(bot.matches_event(&matching));

    let excluded = EventEnvelope::new(
        "pull_request.closed".to_string(),
        Some("closed".to_string()),
        repo.clone(),
        EventEntity::PullRequest { number: 1 },
        serde_json::json!({}),
    );
    assert!(!bot.matches_event(&excluded));

    let wrong_repo = EventEnvelope::new(
        "pull_request.opened".to_string(),
        Some("opened".to_string()),
        other_repo,
        EventEntity::PullRequest { number: 1 },
        serde_json::json!({}),
    );
    assert!(!bot.matches_event(&wrong_repo));
}

#[test]
fn bot_configuration_validate_rejects_duplicate_names_and_empty_event_lists() {
    let bot_a = BotSubscription {
        name: BotName::new("dup").unwrap(),
        queue: QueueName::new("fabric-dup").unwrap(),
        events: vec![EventTypePattern::EntityAll("push".to_string())],
        ordered: false,
        repository_filter: None,
        config: BotSpecificConfig::new(),
    };
    let bot_b = BotSubscription {
        name: BotName::new("dup").unwrap(),
        queue: QueueName::new("fabric-dup2").unwrap(),
        events: vec![],
        ordered: false,
        repository_filter: None,
        config: BotSpecificConfig::new(),
    };

    let config = BotConfiguration {
        bots: vec![bot_a, bot_b],
        settings: BotConfigurationSettings::default(),
    };

    let err = config.validate().unwrap_err();
    match err {
        BotConfigError::ValidationError { errors } => {
            assert!(errors.iter().any(|e| e.contains("duplicate bot name")));
            assert!(errors.iter().any(|e| e.contains("no event subscriptions")));
        }
        other => panic!("expected ValidationError, got {other:?}"),
    }
}

#[test]
fn bot_configuration_get_target_bots_filters_by_subscription() {
    let repo = make_repository("acme", "widgets");
    let bot = BotSubscription {
        name: BotName::new("pusher").unwrap(),
        queue: QueueName::new("fabric-pusher").unwrap(),
        events: vec![EventTypePattern::Exact("push".to_string())],
        ordered: false,
        repository_filter: None,
        config: BotSpecificConfig::new(),
    };
    let config = BotConfiguration {
        bots: vec![bot],
        settings: BotConfigurationSettings::default(),
    };

    let push_event = EventEnvelope::new(
        "push".to_string(),
        None,
        repo.clone(),
        EventEntity::Branch {
            name: "main".to_string(),
        },
        serde_json::json!({}),
    );
    assert_eq!(config.get_target_bots(&push_event).len(), 1);

    let issue_event = EventEnvelope::new(
        "issues.opened".to_string(),
        Some("opened".to_string()),
        repo,
        EventEntity::Issue { number: 1 },
        serde_json::json!({}),
    );
    assert_eq!(config.get_target_bots(&issue_event).len(), 0);
}
