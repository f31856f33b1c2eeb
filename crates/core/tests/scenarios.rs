mod common;

use common::{orders, tids};
use sercop_core::consistency::error::Error;
use sercop_core::graph::{ConflictGraph, ConflictPolicy};
use sercop_core::schedule::error::Error as ScheduleError;
use sercop_core::schedule::{expand, format_schedule};
use sercop_core::{
    analyze, check, check_with_limit, AnalysisOptions, Class, Operation, TransactionId, Verdict,
    Witness,
};

fn strict_graph(schedule: &[Operation<&'static str>]) -> ConflictGraph<&'static str> {
    ConflictGraph::build(schedule, ConflictPolicy::Strict).unwrap()
}

#[test]
fn crossed_reads_and_writes_are_not_serializable() {
    // 1 reads x before 2 overwrites it, 2 reads y before 1 overwrites it.
    let schedule = schedule![
        w(0, x), w(0, y), r(1, x), r(2, y), w(2, x), w(1, y), c(0), c(1), c(2),
    ];
    let graph = strict_graph(&schedule);
    assert!(graph.has_edge(TransactionId(1), TransactionId(2)));
    assert!(graph.has_edge(TransactionId(2), TransactionId(1)));
    assert!(matches!(
        check(&schedule, Class::Csr),
        Err(Error::Cycle {
            class: Class::Csr,
            ..
        })
    ));
}

#[test]
fn initial_writer_precedes_both_readers() {
    let schedule = schedule![
        w(0, x), w(0, y), r(1, x), r(2, y), w(1, x), w(2, y), c(0), c(1), c(2),
    ];
    let graph = strict_graph(&schedule);
    let all: Vec<_> = graph.serial_orders().collect();
    assert_eq!(all, orders(&[&[0, 1, 2], &[0, 2, 1]]));
    assert_eq!(
        check(&schedule, Class::Csr),
        Ok(Witness::SerialOrder(tids(&[0, 1, 2])))
    );

    let options = AnalysisOptions::builder().collect_orders(true).build();
    let report = analyze(&schedule, &options).unwrap();
    assert_eq!(report.csr, Some(Verdict::Holds));
    assert_eq!(report.xcsr, Some(Verdict::Holds));
    assert_eq!(report.ocsr, Some(Verdict::Holds));
    assert_eq!(report.cocsr, Some(Verdict::Holds));
    assert_eq!(report.serial_orders, Some(all));
    assert!(!report.orders_truncated);
}

#[test]
fn same_direction_conflicts_stay_acyclic() {
    let schedule = schedule![r(1, x), w(2, x), r(1, y), w(2, y)];
    let graph = strict_graph(&schedule);
    assert_eq!(graph.multiplicity(TransactionId(1), TransactionId(2)), 2);
    assert_eq!(
        check(&schedule, Class::Csr),
        Ok(Witness::SerialOrder(tids(&[1, 2])))
    );
}

#[test]
fn two_cycle_is_not_serializable() {
    let schedule = schedule![r(1, x), w(2, x), r(2, y), w(1, y)];
    let graph = strict_graph(&schedule);
    assert_eq!(graph.labels(), vec!["r1(x)->w2(x)", "r2(y)->w1(y)"]);

    let report = analyze(&schedule, &AnalysisOptions::default()).unwrap();
    assert_eq!(report.csr, Some(Verdict::Violated));
    assert_eq!(report.ocsr, Some(Verdict::NotApplicable));
    assert_eq!(report.cocsr, Some(Verdict::NotApplicable));
    assert_eq!(report.cycle, Some((TransactionId(1), TransactionId(2))));
}

#[test]
fn cycle_witness_is_stable_across_runs() {
    let schedule = schedule![r(1, x), w(2, x), r(2, y), w(3, y), r(3, z), w(1, z)];
    for _ in 0..50 {
        assert_eq!(
            check(&schedule, Class::Csr),
            Err(Error::Cycle {
                class: Class::Csr,
                a: TransactionId(1),
                b: TransactionId(2),
            })
        );
        let report = analyze(&schedule, &AnalysisOptions::default()).unwrap();
        assert_eq!(report.cycle, Some((TransactionId(1), TransactionId(2))));
    }
}

#[test]
fn abort_expands_into_compensating_write() {
    let schedule = schedule![w(1, x), a(1), w(2, x), c(2)];
    let expanded = expand(&schedule);
    assert_eq!(expanded, schedule![w(1, x), u(1, x), c(1), w(2, x), c(2)]);
    assert_eq!(format_schedule(&expanded), "w1(x) w1^-1(x) c1 w2(x) c2");

    let graph = strict_graph(&expanded);
    assert_eq!(graph.labels(), vec!["w1(x)->w2(x)", "w1^-1(x)->w2(x)"]);
    assert_eq!(check(&schedule, Class::Xcsr), Ok(Witness::Expanded(expanded)));
}

#[test]
fn undo_after_foreign_read_breaks_xcsr() {
    // 2 reads what 1 wrote, then 1 aborts: undoing the write closes a cycle.
    let schedule = schedule![w(1, x), r(2, x), a(1), c(2)];
    assert!(check(&schedule, Class::Csr).is_ok());
    assert!(matches!(
        check(&schedule, Class::Xcsr),
        Err(Error::Cycle {
            class: Class::Xcsr,
            ..
        })
    ));

    let report = analyze(&schedule, &AnalysisOptions::default()).unwrap();
    assert_eq!(report.csr, Some(Verdict::Holds));
    assert_eq!(report.xcsr, Some(Verdict::Violated));
    assert_eq!(
        report.expanded,
        Some(schedule![w(1, x), r(2, x), u(1, x), c(1), c(2)])
    );
}

#[test]
fn real_time_order_contradicts_only_serial_order() {
    // 2 commits before 3 starts, but conflicts force 3 -> 1 -> 2.
    let schedule = schedule![r(1, x), w(2, x), c(2), w(3, y), c(3), w(1, y), c(1)];
    let graph = strict_graph(&schedule);
    let all: Vec<_> = graph.serial_orders().collect();
    assert_eq!(all, orders(&[&[3, 1, 2]]));

    assert!(check(&schedule, Class::Csr).is_ok());
    assert_eq!(check(&schedule, Class::Ocsr), Err(Error::Invalid(Class::Ocsr)));
    // The prerequisite failure is reported as is.
    assert_eq!(check(&schedule, Class::Cocsr), Err(Error::Invalid(Class::Ocsr)));

    let report = analyze(&schedule, &AnalysisOptions::default()).unwrap();
    assert_eq!(report.csr, Some(Verdict::Holds));
    assert_eq!(report.ocsr, Some(Verdict::Violated));
    assert_eq!(report.cocsr, Some(Verdict::NotApplicable));
}

#[test]
fn commit_order_against_conflict_order() {
    let schedule = schedule![r(1, x), w(2, x), c(2), c(1)];
    assert_eq!(
        check(&schedule, Class::Ocsr),
        Ok(Witness::SerialOrder(tids(&[1, 2])))
    );
    assert_eq!(check(&schedule, Class::Cocsr), Err(Error::Invalid(Class::Cocsr)));

    let schedule = schedule![r(1, x), w(2, x), c(1), c(2)];
    assert_eq!(
        check(&schedule, Class::Cocsr),
        Ok(Witness::SerialOrder(tids(&[1, 2])))
    );
}

#[test]
fn unterminated_transaction_is_never_commit_order_preserving() {
    let schedule = schedule![w(1, x), r(2, x), c(1)];
    assert!(check(&schedule, Class::Ocsr).is_ok());
    assert_eq!(check(&schedule, Class::Cocsr), Err(Error::Invalid(Class::Cocsr)));
}

#[test]
fn isolated_transactions_order_anywhere() {
    let schedule = schedule![w(1, x), c(1), r(2, y), c(2), w(3, x), c(3)];
    let graph = strict_graph(&schedule);
    assert_eq!(graph.transactions, tids(&[1, 2, 3]));
    let all: Vec<_> = graph.serial_orders().collect();
    assert_eq!(all, orders(&[&[1, 2, 3], &[1, 3, 2], &[2, 1, 3]]));
    // Real time forces 1 < 2 < 3.
    assert_eq!(
        check(&schedule, Class::Ocsr),
        Ok(Witness::SerialOrder(tids(&[1, 2, 3])))
    );
}

#[test]
fn empty_schedule_is_trivially_in_every_class() {
    let schedule: Vec<Operation<&str>> = schedule![];
    for class in Class::ALL {
        assert!(check(&schedule, class).is_ok(), "{class}");
    }
    assert_eq!(
        check(&schedule, Class::Csr),
        Ok(Witness::SerialOrder(Vec::new()))
    );
}

#[test]
fn enumeration_limit_bounds_the_search() {
    let schedule = schedule![w(1, x), w(2, y), w(3, z), c(3), c(2), c(1)];

    assert_eq!(
        check_with_limit(&schedule, Class::Cocsr, Some(2)),
        Err(Error::EnumerationLimitExceeded {
            class: Class::Cocsr,
            limit: 2,
        })
    );
    assert_eq!(
        check_with_limit(&schedule, Class::Cocsr, Some(6)),
        Ok(Witness::SerialOrder(tids(&[3, 2, 1])))
    );
    // OCSR accepts the very first order.
    assert!(check_with_limit(&schedule, Class::Ocsr, Some(1)).is_ok());
    // CSR never enumerates past the first order.
    assert!(check_with_limit(&schedule, Class::Csr, Some(0)).is_ok());
}

#[test]
fn malformed_schedules_are_rejected() {
    let schedule = schedule![w(1, x), c(1), c(1)];
    assert_eq!(
        check(&schedule, Class::Csr),
        Err(Error::Malformed(ScheduleError::DuplicateTerminator {
            transaction: TransactionId(1),
            first: 1,
            second: 2,
        }))
    );

    let schedule = schedule![w(1, x), a(1), r(1, y)];
    assert!(matches!(
        check(&schedule, Class::Ocsr),
        Err(Error::Malformed(ScheduleError::OperationAfterTerminator { .. }))
    ));

    let schedule = schedule![w(1, x), u(1, x), c(1)];
    assert_eq!(
        check(&schedule, Class::Xcsr),
        Err(Error::Malformed(ScheduleError::CompensatingWrite { position: 1 }))
    );
    assert!(analyze(&schedule, &AnalysisOptions::default()).is_err());
}
