use std::sync::Arc;
use std::thread;

use acl_entry::{
    compile, ActionSpec, AddressSpec, MatchContext, PacketKey, Range, RuleDefinition, RuleSlot,
    SimpleAction, IPPROTO_TCP,
};

fn definition(id: u32, action: ActionSpec) -> RuleDefinition {
    RuleDefinition {
        id,
        src: Some(AddressSpec::subnet("10.0.0.0", 8)),
        protocol: vec![Range::single(IPPROTO_TCP.into())].into(),
        dst_port: vec![Range::new(80, 443)].into(),
        actions: vec![action],
        ..RuleDefinition::default()
    }
}

#[test]
fn evaluate_and_project_across_threads() {
    let rule = Arc::new(compile(&definition(1, ActionSpec::pass())));
    let expected = rule.project();

    let handles: Vec<_> = (0..8u8)
        .map(|n| {
            let rule = Arc::clone(&rule);
            thread::spawn(move || {
                let packet = PacketKey::new(IPPROTO_TCP)
                    .with_src_ip([10, 0, 0, n].into())
                    .with_ports(5000, 80 + u16::from(n));
                let mut ctx = MatchContext::new();
                let verdict = rule.evaluate(&packet, &mut ctx).verdict();
                (verdict, ctx.rule_id, rule.project())
            })
        })
        .collect();

    for handle in handles {
        let (verdict, rule_id, projection) = handle.join().unwrap();
        assert_eq!(verdict, Some(SimpleAction::Pass));
        assert_eq!(rule_id, Some(1));
        assert_eq!(projection, expected);
    }
}

#[test]
fn replace_while_readers_hold_snapshots() {
    let slot = Arc::new(RuleSlot::from_definition(&definition(1, ActionSpec::pass())));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                let packet = PacketKey::new(IPPROTO_TCP)
                    .with_src_ip([10, 1, 1, 1].into())
                    .with_ports(5000, 443);
                for _ in 0..1000 {
                    let rule = slot.load();
                    let mut ctx = MatchContext::new();
                    let outcome = rule.evaluate(&packet, &mut ctx);
                    // Whichever generation was loaded, its id and verdict agree.
                    let expected = if rule.id() % 2 == 1 {
                        SimpleAction::Pass
                    } else {
                        SimpleAction::Deny
                    };
                    assert_eq!(outcome.verdict(), Some(expected));
                    assert_eq!(ctx.rule_id, Some(rule.id()));
                }
            })
        })
        .collect();

    for id in 2..50u32 {
        let action = if id % 2 == 1 {
            ActionSpec::pass()
        } else {
            ActionSpec::deny()
        };
        slot.replace(&definition(id, action));
    }

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(slot.load().id(), 49);
}
