// SPDX-FileCopyrightText: 2026 Stratos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `stratos status` and `stratos plans` command implementations.

use serde_json::json;

use stratos_core::{ServiceKind, StratosError, UserId};
use stratos_plans::QuotaLimit;

use crate::app::App;

/// Show one user's plan, usage counters, and query-log depth.
pub async fn run_status(app: &App, user: UserId, json: bool) -> Result<(), StratosError> {
    let stored_plan = app.users.plan_of(user).await?;
    let Some(stored_plan) = stored_plan else {
        println!("user {user} does not exist");
        return Ok(());
    };
    let plan = app.registry.normalize(&stored_plan);

    let queries = app.quota.usage(user, ServiceKind::Queries).await?;
    let follow_ups = app.quota.usage(user, ServiceKind::FollowUps).await?;
    let documents = app.quota.usage(user, ServiceKind::DocumentUploads).await?;
    let logged = app.query_log.count_for(user).await?;

    if json {
        let payload = json!({
            "user_id": user.0,
            "plan": plan.name,
            "usage": {
                "queries": { "used": queries, "limit": plan.limit_for(ServiceKind::Queries) },
                "follow_ups": { "used": follow_ups, "limit": plan.limit_for(ServiceKind::FollowUps) },
                "document_uploads": { "used": documents, "limit": plan.limit_for(ServiceKind::DocumentUploads) },
            },
            "queries_logged": logged,
        });
        println!("{}", serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string()));
        return Ok(());
    }

    println!("user {user} on {}", plan.name);
    println!(
        "  queries:          {}",
        format_usage(queries, plan.limit_for(ServiceKind::Queries))
    );
    println!(
        "  follow-ups:       {}",
        format_usage(follow_ups, plan.limit_for(ServiceKind::FollowUps))
    );
    println!(
        "  document uploads: {}",
        format_usage(documents, plan.limit_for(ServiceKind::DocumentUploads))
    );
    println!("  queries logged:   {logged}");
    Ok(())
}

fn format_usage(used: u64, limit: QuotaLimit) -> String {
    match limit {
        QuotaLimit::Limited(n) => format!("{used}/{n}"),
        QuotaLimit::Unlimited => format!("{used}/unlimited"),
    }
}

/// List the plan catalog.
pub fn run_plans(app: &App, json: bool) {
    if json {
        let plans: Vec<_> = app.registry.list().collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&plans).unwrap_or_else(|_| "[]".to_string())
        );
        return;
    }
    for plan in app.registry.list() {
        println!(
            "{} (£{}): queries {}, documents {}, experts {}, follow-ups {}, tier {}",
            plan.name,
            plan.price_gbp,
            format_limit(plan.limit_for(ServiceKind::Queries)),
            plan.max_documents,
            plan.max_experts,
            plan.max_follow_ups,
            plan.model_tier,
        );
    }
}

fn format_limit(limit: QuotaLimit) -> String {
    match limit {
        QuotaLimit::Limited(n) => n.to_string(),
        QuotaLimit::Unlimited => "unlimited".to_string(),
    }
}
