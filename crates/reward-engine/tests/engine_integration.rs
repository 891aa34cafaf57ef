//! 奖励引擎集成测试
//!
//! 覆盖规则集构建、引擎评估与状态决策的完整工作流。

use reward_engine::{
    ActivityMetrics, RewardEngine, RewardItem, RewardRequestStatus, RewardType, RuleDecision,
    RuleError, RuleSet, RuleSpec, StatusDecision, decide_status,
};
use serde_json::json;

fn point(amount: f64) -> RewardItem {
    RewardItem::new(RewardType::Point, amount)
}

/// 模拟一个活动的完整规则配置
fn event_rules() -> Vec<RuleSpec> {
    vec![
        RuleSpec::per_condition("login-3", "loginStreak", 3.0).with_reward(point(100.0)),
        RuleSpec::per_condition("invite-2", "inviteCount", 2.0)
            .with_reward(RewardItem::new(RewardType::Coupon, 1.0)),
        RuleSpec::stage("stage-2", "purchaseTotal", 2.0).with_reward(point(20.0)),
        RuleSpec::stage("stage-3", "purchaseTotal", 3.0).with_reward(point(30.0)),
        RuleSpec::final_rule("final", &["login-3", "invite-2"])
            .with_reward(RewardItem::new(RewardType::Cash, 50.0)),
    ]
}

// ==================== 不重复发放 ====================

#[test]
fn test_second_run_with_granted_ids_is_empty() {
    let rule_set = RuleSet::build(&event_rules()).unwrap();
    let engine = RewardEngine::new(&rule_set);

    let activities = [
        ActivityMetrics::new(),
        ActivityMetrics::new().with("loginStreak", 3.0),
        ActivityMetrics::new()
            .with("loginStreak", 10.0)
            .with("inviteCount", 5.0)
            .with("purchaseTotal", 12.0),
    ];
    let histories: [Vec<String>; 3] = [
        vec![],
        vec!["invite-2".to_string()],
        vec!["stage-3".to_string(), "unknown-rule".to_string()],
    ];

    for activity in &activities {
        for past in &histories {
            let first = engine.run(activity, past.as_slice());

            let mut combined = past.clone();
            combined.extend(first.new_achieved_rule_ids.iter().cloned());
            let second = engine.run(activity, combined.as_slice());

            assert!(second.new_achieved_rule_ids.is_empty());
            assert!(second.rewards.is_empty());
        }
    }
}

#[test]
fn test_deterministic_output() {
    let rule_set = RuleSet::build(&event_rules()).unwrap();
    let engine = RewardEngine::new(&rule_set);
    let activity = ActivityMetrics::new()
        .with("loginStreak", 4.0)
        .with("inviteCount", 2.0)
        .with("purchaseTotal", 9.0);

    let first = engine.run(&activity, &["stage-2"]);
    for _ in 0..10 {
        assert_eq!(engine.run(&activity, &["stage-2"]), first);
    }
}

// ==================== PER_CONDITION ====================

#[test]
fn test_per_condition_login_streak() {
    let rule_set = RuleSet::build(&[
        RuleSpec::per_condition("login-3", "loginStreak", 3.0).with_reward(point(100.0))
    ])
    .unwrap();
    let engine = RewardEngine::new(&rule_set);

    let below = engine.run(&ActivityMetrics::new().with("loginStreak", 2.0), &[] as &[&str]);
    assert!(below.rewards.is_empty());
    assert!(below.new_achieved_rule_ids.is_empty());

    let reached = engine.run(&ActivityMetrics::new().with("loginStreak", 3.0), &[] as &[&str]);
    assert_eq!(reached.new_achieved_rule_ids, vec!["login-3"]);
    assert_eq!(reached.rewards, vec![point(100.0)]);
}

// ==================== FINAL ====================

#[test]
fn test_final_fires_when_prerequisite_met_in_same_pass() {
    let rule_set = RuleSet::build(&[
        RuleSpec::per_condition("A", "loginStreak", 1.0).with_reward(point(1.0)),
        RuleSpec::per_condition("B", "inviteCount", 1.0).with_reward(point(2.0)),
        RuleSpec::final_rule("F", &["A", "B"]).with_reward(point(3.0)),
    ])
    .unwrap();
    let engine = RewardEngine::new(&rule_set);

    // A 已在历史中达成，B 在本次遍历中达成
    let activity = ActivityMetrics::new().with("inviteCount", 1.0);
    let outcome = engine.run(&activity, &["A"]);

    assert_eq!(outcome.new_achieved_rule_ids, vec!["B", "F"]);
    assert_eq!(outcome.rewards, vec![point(2.0), point(3.0)]);
}

#[test]
fn test_evaluation_order_matters() {
    let final_first = vec![
        RuleSpec::final_rule("F", &["X"]).with_reward(point(10.0)),
        RuleSpec::per_condition("X", "loginStreak", 1.0).with_reward(point(1.0)),
    ];
    let activity = ActivityMetrics::new().with("loginStreak", 1.0);

    let rule_set = RuleSet::build(&final_first).unwrap();
    let outcome = RewardEngine::new(&rule_set).run(&activity, &[] as &[&str]);
    assert_eq!(outcome.new_achieved_rule_ids, vec!["X"]);
    assert_eq!(outcome.rewards, vec![point(1.0)]);

    let mut reversed = final_first;
    reversed.reverse();
    let rule_set = RuleSet::build(&reversed).unwrap();
    let outcome = RewardEngine::new(&rule_set).run(&activity, &[] as &[&str]);
    assert_eq!(outcome.new_achieved_rule_ids, vec!["X", "F"]);
    assert_eq!(outcome.rewards, vec![point(1.0), point(10.0)]);
}

// ==================== STAGE ====================

#[test]
fn test_stage_threshold_five_uses_literal_stage_count_comparison() {
    let rule_set = RuleSet::build(&[
        RuleSpec::stage("stage-5", "purchaseTotal", 5.0).with_reward(point(5.0))
    ])
    .unwrap();
    let engine = RewardEngine::new(&rule_set).with_trace();

    let four = engine.run(&ActivityMetrics::new().with("purchaseTotal", 4.0), &[] as &[&str]);
    assert!(four.rewards.is_empty());
    assert_eq!(four.trace[0].decision, RuleDecision::BelowThreshold);

    // floor(5 / 5) = 1，小于阈值 5，不发放
    let five = engine.run(&ActivityMetrics::new().with("purchaseTotal", 5.0), &[] as &[&str]);
    assert!(five.rewards.is_empty());
    assert!(five.new_achieved_rule_ids.is_empty());
    assert_eq!(five.trace[0].decision, RuleDecision::StageCountNotReached);

    // floor(24 / 5) = 4，仍不足
    let twenty_four =
        engine.run(&ActivityMetrics::new().with("purchaseTotal", 24.0), &[] as &[&str]);
    assert!(twenty_four.rewards.is_empty());

    // floor(25 / 5) = 5，发放
    let twenty_five =
        engine.run(&ActivityMetrics::new().with("purchaseTotal", 25.0), &[] as &[&str]);
    assert_eq!(twenty_five.new_achieved_rule_ids, vec!["stage-5"]);
    assert_eq!(twenty_five.rewards, vec![point(5.0)]);
}

#[test]
fn test_stage_ladder() {
    let rule_set = RuleSet::build(&event_rules()).unwrap();
    let engine = RewardEngine::new(&rule_set);

    // floor(4/2)=2>=2 发放 stage-2；floor(4/3)=1<3 不发放 stage-3
    let outcome = engine.run(&ActivityMetrics::new().with("purchaseTotal", 4.0), &[] as &[&str]);
    assert_eq!(outcome.new_achieved_rule_ids, vec!["stage-2"]);

    // floor(9/3)=3>=3 发放 stage-3
    let outcome = engine.run(&ActivityMetrics::new().with("purchaseTotal", 9.0), &["stage-2"]);
    assert_eq!(outcome.new_achieved_rule_ids, vec!["stage-3"]);
    assert_eq!(outcome.rewards, vec![point(30.0)]);
}

#[test]
fn test_stage_same_threshold_granted_once() {
    let rule_set = RuleSet::build(&[
        RuleSpec::stage("a", "purchaseTotal", 2.0).with_reward(point(1.0)),
        RuleSpec::stage("b", "inviteCount", 2.0).with_reward(point(2.0)),
    ])
    .unwrap();
    let activity = ActivityMetrics::new()
        .with("purchaseTotal", 4.0)
        .with("inviteCount", 4.0);

    let outcome = RewardEngine::new(&rule_set).run(&activity, &[] as &[&str]);
    assert_eq!(outcome.new_achieved_rule_ids, vec!["a"]);

    // 历史中已有同阈值阶段
    let outcome = RewardEngine::new(&rule_set).run(&activity, &["b"]);
    assert!(outcome.new_achieved_rule_ids.is_empty());
}

// ==================== 构建错误 ====================

#[test]
fn test_unsupported_rule_type_builds_nothing() {
    let specs = vec![
        RuleSpec::per_condition("login-3", "loginStreak", 3.0),
        RuleSpec::new("bonus", "BONUS", json!({"metric": "loginStreak"})),
    ];

    let result = RuleSet::build(&specs);
    assert_eq!(result, Err(RuleError::UnsupportedRuleType("BONUS".to_string())));
}

#[test]
fn test_rule_specs_from_json() {
    let json = r#"
    [
        {
            "id": "665f1c2a9b1e8a0012345678",
            "ruleType": "PER_CONDITION",
            "rewardItems": [{"type": "POINT", "amount": 500}],
            "config": {"metric": "inviteCount", "perThreshold": 3}
        },
        {
            "id": "665f1c2a9b1e8a0012345679",
            "ruleType": "FINAL",
            "rewardItems": [{"type": "ITEM", "amount": 1}],
            "config": {"prerequisiteRuleIds": ["665f1c2a9b1e8a0012345678"]}
        }
    ]
    "#;

    let specs: Vec<RuleSpec> = serde_json::from_str(json).unwrap();
    let rule_set = RuleSet::build(&specs).unwrap();
    let activity: ActivityMetrics = serde_json::from_str(r#"{"inviteCount": 3}"#).unwrap();

    let outcome = RewardEngine::new(&rule_set).run(&activity, &[] as &[&str]);
    assert_eq!(outcome.new_achieved_rule_ids.len(), 2);
    assert_eq!(
        outcome.rewards,
        vec![point(500.0), RewardItem::new(RewardType::Item, 1.0)]
    );
}

// ==================== 状态决策 ====================

#[test]
fn test_condition_not_met_is_always_failed() {
    for auto in [true, false] {
        let decision = decide_status(auto, &[], &[point(1.0)]);
        assert_eq!(decision.status, RewardRequestStatus::Failed);
        assert!(!decision.condition_met);
    }
}

#[test]
fn test_status_from_engine_outcome() {
    let rule_set = RuleSet::build(&event_rules()).unwrap();
    let outcome = RewardEngine::new(&rule_set)
        .run(&ActivityMetrics::new().with("loginStreak", 3.0), &[] as &[&str]);

    assert_eq!(
        StatusDecision::from_outcome(true, &outcome).status,
        RewardRequestStatus::Success
    );
    assert_eq!(
        StatusDecision::from_outcome(false, &outcome).status,
        RewardRequestStatus::Pending
    );
}

#[test]
fn test_granted_rule_without_rewards_is_not_condition_met() {
    let rule_set =
        RuleSet::build(&[RuleSpec::per_condition("empty", "loginStreak", 1.0)]).unwrap();
    let outcome = RewardEngine::new(&rule_set)
        .run(&ActivityMetrics::new().with("loginStreak", 1.0), &[] as &[&str]);

    assert_eq!(outcome.new_achieved_rule_ids, vec!["empty"]);
    let decision = StatusDecision::from_outcome(true, &outcome);
    assert!(!decision.condition_met);
    assert_eq!(decision.status, RewardRequestStatus::Failed);
}
