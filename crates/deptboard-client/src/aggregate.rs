//! Read-only aggregations over a [`Snapshot`]: the calendar and the
//! system-update report.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike as _, NaiveDate, TimeZone};
use deptboard_core::activity::SignalKind;
use strum::IntoEnumIterator as _;

use crate::view::{ActivitySignal, Snapshot};

// ─── Calendar ─────────────────────────────────────────────────────────────────

/// Signals falling on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
  /// Every kind is present, possibly with a zero count.
  pub counts:  BTreeMap<SignalKind, usize>,
  /// Department order, then feed order within a department.
  pub signals: Vec<ActivitySignal>,
}

impl Default for DaySummary {
  fn default() -> Self {
    Self {
      counts:  SignalKind::iter().map(|k| (k, 0)).collect(),
      signals: Vec::new(),
    }
  }
}

impl DaySummary {
  pub fn count(&self, kind: SignalKind) -> usize {
    self.counts.get(&kind).copied().unwrap_or(0)
  }
}

/// `MM-DD` key of a day.
pub fn day_key(month: u32, day: u32) -> String {
  format!("{month:02}-{day:02}")
}

/// Group every signal by the `MM-DD` day it falls on in `tz`.
///
/// Signals are not re-sorted across departments.
pub fn calendar_by_day<Tz: TimeZone>(snapshot: &Snapshot, tz: &Tz) -> BTreeMap<String, DaySummary> {
  let mut days: BTreeMap<String, DaySummary> = BTreeMap::new();
  for signal in snapshot.all_signals() {
    let local = signal.timestamp.with_timezone(tz);
    let day = days.entry(day_key(local.month(), local.day())).or_default();
    *day.counts.entry(signal.kind).or_default() += 1;
    day.signals.push(signal.clone());
  }
  days
}

/// Layout of one month on a Sunday-first grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarMonth {
  pub year:   i32,
  pub month:  u32,
  pub days:   u32,
  /// Blank cells before the 1st (0 = Sunday).
  pub offset: u32,
}

impl CalendarMonth {
  /// `None` for an out-of-range month.
  pub fn new(year: i32, month: u32) -> Option<Self> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
      NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
      NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(Self {
      year,
      month,
      days:   (next - first).num_days() as u32,
      offset: first.weekday().num_days_from_sunday(),
    })
  }

  pub fn containing(date: NaiveDate) -> Option<Self> {
    Self::new(date.year(), date.month())
  }

  pub fn previous(self) -> Option<Self> {
    match self.month {
      1 => Self::new(self.year - 1, 12),
      m => Self::new(self.year, m - 1),
    }
  }

  pub fn next(self) -> Option<Self> {
    match self.month {
      12 => Self::new(self.year + 1, 1),
      m => Self::new(self.year, m + 1),
    }
  }

  /// Grid cells: `None` for leading blanks, then each day number.
  pub fn cells(&self) -> Vec<Option<u32>> {
    (0..self.offset)
      .map(|_| None)
      .chain((1..=self.days).map(Some))
      .collect()
  }

  pub fn key(&self, day: u32) -> String {
    day_key(self.month, day)
  }
}

// ─── Report ───────────────────────────────────────────────────────────────────

/// Reverse-chronological feed of system updates across all departments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
  pub updates:  Vec<ActivitySignal>,
  pub total:    usize,
  /// Number of distinct departments with at least one update.
  pub coverage: usize,
}

pub fn report(snapshot: &Snapshot) -> Report {
  let mut updates: Vec<ActivitySignal> = snapshot
    .all_signals()
    .filter(|s| s.kind == SignalKind::SystemUpdate)
    .cloned()
    .collect();
  updates.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

  let coverage = updates
    .iter()
    .map(|s| s.department.as_str())
    .collect::<BTreeSet<_>>()
    .len();
  Report { total: updates.len(), coverage, updates }
}

#[cfg(test)]
mod tests {
  use super::*;

  use chrono::{DateTime, FixedOffset, Utc};

  use crate::view::{DepartmentView, Lang};

  fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
  }

  fn signal(id: i64, dept: &str, kind: SignalKind, ts: &str) -> ActivitySignal {
    ActivitySignal {
      id,
      department: dept.into(),
      kind,
      pinned:     kind == SignalKind::SystemUpdate,
      content:    format!("signal {id}"),
      author:     None,
      timestamp:  at(ts),
    }
  }

  fn snapshot(feeds: Vec<(&str, Vec<ActivitySignal>)>) -> Snapshot {
    let mut s = Snapshot { lang: Lang::En, ..Snapshot::default() };
    for (i, (name, feed)) in feeds.into_iter().enumerate() {
      let mut dept = DepartmentView::placeholder(name);
      dept.id = i as i64 + 1;
      s.departments.push(dept);
      s.signals.insert(name.to_owned(), feed);
    }
    s
  }

  #[test]
  fn calendar_groups_by_month_day() {
    let s = snapshot(vec![(
      "IT",
      vec![
        signal(3, "IT", SignalKind::Request, "2026-02-09T00:00:00Z"),
        signal(2, "IT", SignalKind::Request, "2026-02-08T15:00:00Z"),
        signal(1, "IT", SignalKind::Meeting, "2026-02-08T09:00:00Z"),
      ],
    )]);

    let days = calendar_by_day(&s, &Utc);
    let feb8 = &days["02-08"];
    assert_eq!(feb8.count(SignalKind::Meeting), 1);
    assert_eq!(feb8.count(SignalKind::Request), 1);
    assert_eq!(feb8.count(SignalKind::Feedback), 0);
    assert_eq!(feb8.signals.len(), 2);

    let feb9 = &days["02-09"];
    assert_eq!(feb9.signals.len(), 1);
    assert_eq!(feb9.signals[0].id, 3);
  }

  #[test]
  fn calendar_uses_the_given_timezone() {
    let s = snapshot(vec![(
      "IT",
      vec![signal(1, "IT", SignalKind::Feedback, "2026-02-08T20:00:00Z")],
    )]);
    let kuala_lumpur = FixedOffset::east_opt(8 * 3600).unwrap();

    let days = calendar_by_day(&s, &kuala_lumpur);
    assert!(days.contains_key("02-09"));
    assert!(!days.contains_key("02-08"));
  }

  #[test]
  fn calendar_keeps_department_then_feed_order() {
    let s = snapshot(vec![
      ("SALES", vec![signal(1, "SALES", SignalKind::Request, "2026-03-01T08:00:00Z")]),
      ("IT", vec![
        signal(3, "IT", SignalKind::Request, "2026-03-01T12:00:00Z"),
        signal(2, "IT", SignalKind::Request, "2026-03-01T10:00:00Z"),
      ]),
    ]);

    let ids: Vec<_> = calendar_by_day(&s, &Utc)["03-01"].signals.iter().map(|s| s.id).collect();
    assert_eq!(ids, [1, 3, 2]);
  }

  #[test]
  fn report_is_newest_first_with_coverage() {
    let s = snapshot(vec![
      ("SALES", vec![
        signal(3, "SALES", SignalKind::SystemUpdate, "2026-02-10T00:00:00Z"),
        signal(9, "SALES", SignalKind::Request, "2026-02-11T00:00:00Z"),
        signal(1, "SALES", SignalKind::SystemUpdate, "2026-02-01T00:00:00Z"),
      ]),
      ("IT", vec![signal(2, "IT", SignalKind::SystemUpdate, "2026-02-05T00:00:00Z")]),
      ("FINANCE", vec![signal(8, "FINANCE", SignalKind::Meeting, "2026-02-06T00:00:00Z")]),
    ]);

    let r = report(&s);
    let ids: Vec<_> = r.updates.iter().map(|s| s.id).collect();
    assert_eq!(ids, [3, 2, 1]);
    assert_eq!(r.total, 3);
    assert_eq!(r.coverage, 2);
  }

  #[test]
  fn empty_report() {
    let r = report(&Snapshot::default());
    assert!(r.updates.is_empty());
    assert_eq!((r.total, r.coverage), (0, 0));
  }

  #[test]
  fn month_layout() {
    // 1 Feb 2026 is a Sunday.
    let feb = CalendarMonth::new(2026, 2).unwrap();
    assert_eq!((feb.days, feb.offset), (28, 0));
    assert_eq!(feb.key(8), "02-08");

    let leap = CalendarMonth::new(2024, 2).unwrap();
    assert_eq!(leap.days, 29);
    // 1 Feb 2024 is a Thursday.
    assert_eq!(leap.offset, 4);
    let cells = leap.cells();
    assert_eq!(cells.len(), 33);
    assert_eq!(&cells[..5], &[None, None, None, None, Some(1)]);

    assert!(CalendarMonth::new(2026, 13).is_none());
  }

  #[test]
  fn month_navigation_wraps_years() {
    let dec = CalendarMonth::new(2025, 12).unwrap();
    assert_eq!(dec.next(), CalendarMonth::new(2026, 1));
    assert_eq!(CalendarMonth::new(2026, 1).unwrap().previous(), Some(dec));

    let date = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
    assert_eq!(CalendarMonth::containing(date), CalendarMonth::new(2026, 2));
  }
}
