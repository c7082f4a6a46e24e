// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `stratos ask` and `stratos follow-up` command implementations.
//!
//! The report serving path: normalize the query, track popularity, try the
//! cache (user-scoped fingerprint first, then the shared pre-warmed one),
//! pass the quota gate, generate, and record the result. Follow-ups run the
//! same shape over their own cache namespace, carrying the AI-memory record
//! into the prompt for continuity and generating at the plan's follow-up
//! tier.

use std::sync::Arc;

use tracing::info;

use stratos_core::{
    Fingerprint, QueryLog, QueryRecord, ReportGenerator, ServiceKind, StratosError, UserId,
};
use stratos_quota::{Admission, DenialReason, GrantReason};

use crate::app::App;

/// Outcome of one ask, for display.
pub enum AskOutcome {
    /// Served from cache; no quota consumed, no generation call.
    Cached(String),
    /// Freshly generated.
    Generated(String),
    /// Refused by the quota gate.
    Refused(DenialReason),
}

/// Run the serving path for one query.
pub async fn run_ask(
    app: &App,
    generator: Arc<dyn ReportGenerator>,
    user: UserId,
    archetype: &str,
    raw_query: &str,
    max_tokens: u32,
) -> Result<AskOutcome, StratosError> {
    let plan_name = app
        .users
        .plan_of(user)
        .await?
        .ok_or_else(|| StratosError::Internal(format!("user {user} does not exist")))?;

    let query = stratos_cache::normalize_query(raw_query);
    if query.is_empty() {
        return Err(StratosError::Internal(
            "query is empty after normalization".to_string(),
        ));
    }

    app.frequency.record(raw_query).await?;

    // Cache first: a hit consumes no quota.
    let fingerprint = Fingerprint::for_user(user, archetype, &query);
    if let Some(report) = app.cache.cached_report(&fingerprint).await? {
        info!(user_id = %user, "served from user cache");
        return Ok(AskOutcome::Cached(report));
    }
    let shared = Fingerprint::shared(&query);
    if let Some(report) = app.cache.cached_report(&shared).await? {
        info!(user_id = %user, "served from pre-warmed cache");
        return Ok(AskOutcome::Cached(report));
    }

    match app
        .quota
        .check_and_consume(user, &plan_name, ServiceKind::Queries)
        .await?
    {
        Admission::Denied(reason) => return Ok(AskOutcome::Refused(reason)),
        Admission::Granted(_) => {}
    }

    // Stale plan names still serve, on the default tier.
    let plan = app.registry.normalize(&plan_name);
    let report = generator
        .generate(&query, plan.model_tier, max_tokens)
        .await?;

    app.cache.store_report(&fingerprint, &report).await?;
    app.cache.remember(user, &query, &report).await?;
    app.query_log
        .append(&QueryRecord::new(
            user,
            query.clone(),
            report.clone(),
            plan.name.clone(),
        ))
        .await?;

    Ok(AskOutcome::Generated(report))
}

/// Run the serving path for one follow-up question.
pub async fn run_follow_up(
    app: &App,
    generator: Arc<dyn ReportGenerator>,
    user: UserId,
    archetype: &str,
    raw_query: &str,
    max_tokens: u32,
) -> Result<AskOutcome, StratosError> {
    let plan_name = app
        .users
        .plan_of(user)
        .await?
        .ok_or_else(|| StratosError::Internal(format!("user {user} does not exist")))?;

    let query = stratos_cache::normalize_query(raw_query);
    if query.is_empty() {
        return Err(StratosError::Internal(
            "query is empty after normalization".to_string(),
        ));
    }

    let fingerprint = Fingerprint::for_user(user, archetype, &query);
    if let Some(answer) = app.cache.cached_follow_up(&fingerprint).await? {
        info!(user_id = %user, "follow-up served from cache");
        return Ok(AskOutcome::Cached(answer));
    }

    let admission = app
        .quota
        .check_and_consume(user, &plan_name, ServiceKind::FollowUps)
        .await?;
    let reason = match admission {
        Admission::Denied(reason) => return Ok(AskOutcome::Refused(reason)),
        Admission::Granted(reason) => reason,
    };
    // One-time follow-up admission is check-only; depletion is this
    // explicit step.
    if reason == GrantReason::OneTimeFollowUp {
        app.quota.consume_one_time_follow_up(user).await?;
    }

    // Carry the previous exchange so the answer stays in context.
    let prompt = match app.cache.recall(user).await? {
        Some(memory) => format!(
            "Previous question: {}\nPrevious answer: {}\nFollow-up question: {}",
            memory.query, memory.response, query
        ),
        None => query.clone(),
    };

    let plan = app.registry.normalize(&plan_name);
    let answer = generator
        .generate(&prompt, plan.follow_up_tier(), max_tokens)
        .await?;

    app.cache.store_follow_up(&fingerprint, &answer).await?;
    app.cache.remember(user, &query, &answer).await?;
    app.query_log
        .append(&QueryRecord::new(
            user,
            query.clone(),
            answer.clone(),
            plan.name.clone(),
        ))
        .await?;

    Ok(AskOutcome::Generated(answer))
}

/// Print an outcome for the terminal.
pub fn print_outcome(outcome: &AskOutcome) {
    match outcome {
        AskOutcome::Cached(report) => {
            println!("(cached)\n{report}");
        }
        AskOutcome::Generated(report) => {
            println!("{report}");
        }
        AskOutcome::Refused(reason) => match reason {
            DenialReason::UnknownPlan => {
                println!("Your account references an unknown plan; contact support.");
            }
            DenialReason::LimitReached => {
                println!("Query limit reached. Upgrade your plan for more.");
            }
            DenialReason::OneTimeExhausted => {
                println!("Your one-time report has been used. Purchase again for another.");
            }
        },
    }
}

/// Print a follow-up outcome for the terminal.
pub fn print_follow_up_outcome(outcome: &AskOutcome) {
    match outcome {
        AskOutcome::Cached(answer) => {
            println!("(cached)\n{answer}");
        }
        AskOutcome::Generated(answer) => {
            println!("{answer}");
        }
        AskOutcome::Refused(reason) => match reason {
            DenialReason::UnknownPlan => {
                println!("Your account references an unknown plan; contact support.");
            }
            DenialReason::LimitReached => {
                println!("Follow-up limit reached. Upgrade your plan for more.");
            }
            DenialReason::OneTimeExhausted => {
                println!("No follow-ups remain on your one-time report.");
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratos_config::StratosConfig;
    use stratos_storage::{Database, NewUser};
    use stratos_test_utils::ScriptedGenerator;

    async fn app() -> App {
        let db = Database::open_in_memory().await.unwrap();
        App::assemble(db, &StratosConfig::default()).unwrap()
    }

    async fn free_user(app: &App, email: &str) -> UserId {
        app.users
            .create(NewUser {
                email: email.to_string(),
                password_hash: "$argon2id$stub".to_string(),
                plan: "The Foundation (Free)".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn generates_caches_and_logs_then_serves_cached() {
        let app = app().await;
        let user = free_user(&app, "a@example.com").await;
        let generator = Arc::new(ScriptedGenerator::new());

        let first = run_ask(
            &app,
            Arc::clone(&generator) as Arc<dyn ReportGenerator>,
            user,
            "visionary",
            "how do I scale my bakery",
            512,
        )
        .await
        .unwrap();
        assert!(matches!(first, AskOutcome::Generated(_)));
        assert_eq!(generator.calls(), 1);
        assert_eq!(app.query_log.count_for(user).await.unwrap(), 1);
        assert_eq!(app.quota.usage(user, ServiceKind::Queries).await.unwrap(), 1);

        // Same question again: cache hit, no quota, no generation.
        let second = run_ask(
            &app,
            Arc::clone(&generator) as Arc<dyn ReportGenerator>,
            user,
            "visionary",
            "How do I scale my bakery",
            512,
        )
        .await
        .unwrap();
        assert!(matches!(second, AskOutcome::Cached(_)));
        assert_eq!(generator.calls(), 1);
        assert_eq!(app.quota.usage(user, ServiceKind::Queries).await.unwrap(), 1);

        // Memory carries the exchange.
        let memory = app.cache.recall(user).await.unwrap().unwrap();
        assert_eq!(memory.query, "How do i scale my bakery");
    }

    #[tokio::test]
    async fn free_tier_refuses_fourth_distinct_query() {
        let app = app().await;
        let user = free_user(&app, "b@example.com").await;
        let generator = Arc::new(ScriptedGenerator::new()) as Arc<dyn ReportGenerator>;

        for i in 0..3 {
            let outcome = run_ask(
                &app,
                Arc::clone(&generator),
                user,
                "operator",
                &format!("question number {i}"),
                512,
            )
            .await
            .unwrap();
            assert!(matches!(outcome, AskOutcome::Generated(_)));
        }
        let refused = run_ask(
            &app,
            generator,
            user,
            "operator",
            "question number 99",
            512,
        )
        .await
        .unwrap();
        assert!(matches!(
            refused,
            AskOutcome::Refused(DenialReason::LimitReached)
        ));
    }

    #[tokio::test]
    async fn follow_up_meters_caches_and_carries_memory() {
        let app = app().await;
        let user = free_user(&app, "d@example.com").await;
        let generator = Arc::new(ScriptedGenerator::new());

        // Seed memory with an initial ask.
        run_ask(
            &app,
            Arc::clone(&generator) as Arc<dyn ReportGenerator>,
            user,
            "visionary",
            "how do I scale my bakery",
            512,
        )
        .await
        .unwrap();

        let outcome = run_follow_up(
            &app,
            Arc::clone(&generator) as Arc<dyn ReportGenerator>,
            user,
            "visionary",
            "what about a second location",
            512,
        )
        .await
        .unwrap();
        let AskOutcome::Generated(answer) = outcome else {
            panic!("expected generated follow-up");
        };
        // Continuity: the prompt carries the previous exchange.
        assert!(answer.contains("Previous question: How do i scale my bakery"));
        assert_eq!(
            app.quota.usage(user, ServiceKind::FollowUps).await.unwrap(),
            1
        );
        assert_eq!(app.query_log.count_for(user).await.unwrap(), 2);

        // Same follow-up again: cache hit, no extra generation or quota.
        let again = run_follow_up(
            &app,
            Arc::clone(&generator) as Arc<dyn ReportGenerator>,
            user,
            "visionary",
            "what about a second location",
            512,
        )
        .await
        .unwrap();
        assert!(matches!(again, AskOutcome::Cached(_)));
        assert_eq!(generator.calls(), 2);
        assert_eq!(
            app.quota.usage(user, ServiceKind::FollowUps).await.unwrap(),
            1
        );

        // Free tier allows a single follow-up.
        let refused = run_follow_up(
            &app,
            Arc::clone(&generator) as Arc<dyn ReportGenerator>,
            user,
            "visionary",
            "a different follow-up",
            512,
        )
        .await
        .unwrap();
        assert!(matches!(
            refused,
            AskOutcome::Refused(DenialReason::LimitReached)
        ));
    }

    #[tokio::test]
    async fn follow_up_runs_at_the_plans_follow_up_tier() {
        let app = app().await;
        let user = app
            .users
            .create(NewUser {
                email: "pro@example.com".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                plan: "The Professional".to_string(),
            })
            .await
            .unwrap();
        let generator = Arc::new(ScriptedGenerator::new());

        let outcome = run_follow_up(
            &app,
            Arc::clone(&generator) as Arc<dyn ReportGenerator>,
            user,
            "visionary",
            "and the margins",
            512,
        )
        .await
        .unwrap();
        let AskOutcome::Generated(answer) = outcome else {
            panic!("expected generated follow-up");
        };
        // Professional reports run premium, follow-ups standard.
        assert!(answer.starts_with("[standard]"));
    }

    #[tokio::test]
    async fn one_time_follow_ups_deplete_through_the_serving_path() {
        let app = app().await;
        let user = app
            .users
            .create(NewUser {
                email: "ot@example.com".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                plan: stratos_plans::ONE_TIME_REPORT.to_string(),
            })
            .await
            .unwrap();
        app.quota.grant_one_time_access(user).await.unwrap();
        let generator = Arc::new(ScriptedGenerator::new());

        for question in ["first follow-up", "second follow-up"] {
            let outcome = run_follow_up(
                &app,
                Arc::clone(&generator) as Arc<dyn ReportGenerator>,
                user,
                "visionary",
                question,
                512,
            )
            .await
            .unwrap();
            assert!(matches!(outcome, AskOutcome::Generated(_)));
        }

        let refused = run_follow_up(
            &app,
            Arc::clone(&generator) as Arc<dyn ReportGenerator>,
            user,
            "visionary",
            "third follow-up",
            512,
        )
        .await
        .unwrap();
        assert!(matches!(
            refused,
            AskOutcome::Refused(DenialReason::OneTimeExhausted)
        ));
    }

    #[tokio::test]
    async fn prewarmed_entry_serves_before_quota() {
        let app = app().await;
        let user = free_user(&app, "c@example.com").await;
        app.cache
            .store_prewarmed(&Fingerprint::shared("Popular question"), "warm report")
            .await
            .unwrap();

        let generator = Arc::new(ScriptedGenerator::new());
        let outcome = run_ask(
            &app,
            Arc::clone(&generator) as Arc<dyn ReportGenerator>,
            user,
            "visionary",
            "popular   question",
            512,
        )
        .await
        .unwrap();
        assert!(matches!(outcome, AskOutcome::Cached(_)));
        assert_eq!(generator.calls(), 0);
        assert_eq!(app.quota.usage(user, ServiceKind::Queries).await.unwrap(), 0);
    }
}
