//! Read-side reporting
//!
//! Pure day-grouped aggregations over orders and top-up events. No side
//! effects; each report reads one snapshot of the stores and partitions
//! rows by the UTC date of the relevant timestamp.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::models::{Order, TopUp};
use crate::orders::OrderStatus;
use crate::utils::millis_to_date;

/// Per-day order counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct DayOrderStats {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub success_orders: i64,
}

/// One calendar day of a restaurant's orders, keyed by collection time
#[derive(Debug, Clone, Serialize)]
pub struct OrdersByDay {
    pub date: String,
    pub stats: DayOrderStats,
    pub orders: Vec<Order>,
}

/// Group orders by the UTC date of `collection_time`, newest day first
pub fn group_orders_by_collection_day(orders: Vec<Order>) -> Vec<OrdersByDay> {
    let mut by_day: BTreeMap<String, OrdersByDay> = BTreeMap::new();

    for order in orders {
        let date = millis_to_date(order.collection_time);
        let entry = by_day.entry(date.clone()).or_insert_with(|| OrdersByDay {
            date,
            stats: DayOrderStats::default(),
            orders: Vec::new(),
        });

        entry.stats.total_orders += 1;
        match order.status {
            OrderStatus::Pending => entry.stats.pending_orders += 1,
            OrderStatus::Success => entry.stats.success_orders += 1,
            _ => {}
        }
        entry.orders.push(order);
    }

    by_day.into_values().rev().collect()
}

/// Count + amount sum over one member's tracks for one day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackStat {
    pub count: i64,
    pub amount: i64,
}

/// A restaurant member in the accounts report
#[derive(Debug, Clone, Serialize)]
pub struct MemberInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub title: String,
    pub is_active: bool,
}

/// One member's activity on one day
#[derive(Debug, Clone, Serialize)]
pub struct MemberActivity {
    pub info: MemberInfo,
    pub topups: Vec<TopUp>,
    pub orders: Vec<Order>,
    pub topup_stat: TrackStat,
    pub order_stat: TrackStat,
}

/// One calendar day of the accounts report
#[derive(Debug, Clone, Serialize)]
pub struct AccountsDay {
    pub date: String,
    pub members: Vec<MemberActivity>,
}

/// Accounts report: per day, per member, the top-ups they made (by
/// `created_at`) and the orders they settled (by `updated_at`), with
/// counts and amount sums. Days sorted descending; every listed member
/// appears on every active day, even with zero activity.
pub fn group_accounts_by_day(
    members: &[MemberInfo],
    topups: Vec<TopUp>,
    settled_orders: Vec<Order>,
) -> Vec<AccountsDay> {
    let mut dates: Vec<String> = topups
        .iter()
        .map(|t| millis_to_date(t.created_at))
        .chain(settled_orders.iter().map(|o| millis_to_date(o.updated_at)))
        .collect();
    dates.sort();
    dates.dedup();
    dates.reverse();

    dates
        .into_iter()
        .map(|date| {
            let members = members
                .iter()
                .map(|member| {
                    let member_topups: Vec<TopUp> = topups
                        .iter()
                        .filter(|t| {
                            t.maker_id == member.id && millis_to_date(t.created_at) == date
                        })
                        .cloned()
                        .collect();
                    let member_orders: Vec<Order> = settled_orders
                        .iter()
                        .filter(|o| {
                            o.succeeded_by.as_deref() == Some(member.id.as_str())
                                && millis_to_date(o.updated_at) == date
                        })
                        .cloned()
                        .collect();

                    let topup_stat = TrackStat {
                        count: member_topups.len() as i64,
                        amount: member_topups.iter().map(|t| t.amount).sum(),
                    };
                    let order_stat = TrackStat {
                        count: member_orders.len() as i64,
                        amount: member_orders.iter().map(|o| o.total).sum(),
                    };

                    MemberActivity {
                        info: member.clone(),
                        topups: member_topups,
                        orders: member_orders,
                        topup_stat,
                        order_stat,
                    }
                })
                .collect();

            AccountsDay { date, members }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY1: i64 = 1718400000000; // 2024-06-14T22:40Z
    const DAY2: i64 = 1718500000000; // 2024-06-16T02:26Z

    fn order(id: &str, status: OrderStatus, collection_time: i64) -> Order {
        Order {
            id: id.to_string(),
            customer_id: "customer-1".to_string(),
            restaurant_id: "res-1".to_string(),
            total: 300,
            status,
            collection_time,
            scanned_by: None,
            succeeded_by: None,
            created_at: collection_time,
            updated_at: collection_time,
        }
    }

    fn topup(id: &str, maker_id: &str, amount: i64, created_at: i64) -> TopUp {
        TopUp {
            id: id.to_string(),
            maker_id: maker_id.to_string(),
            user_id: "customer-1".to_string(),
            amount,
            created_at,
        }
    }

    #[test]
    fn test_orders_grouped_by_day_descending() {
        let orders = vec![
            order("o1", OrderStatus::Pending, DAY1),
            order("o2", OrderStatus::Success, DAY2),
            order("o3", OrderStatus::Cancelled, DAY1),
            order("o4", OrderStatus::Success, DAY1),
        ];

        let grouped = group_orders_by_collection_day(orders);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].date, "2024-06-16");
        assert_eq!(grouped[1].date, "2024-06-14");

        let day1 = &grouped[1];
        assert_eq!(day1.stats.total_orders, 3);
        assert_eq!(day1.stats.pending_orders, 1);
        assert_eq!(day1.stats.success_orders, 1);
        assert_eq!(day1.orders.len(), 3);
    }

    #[test]
    fn test_empty_orders_yield_no_groups() {
        assert!(group_orders_by_collection_day(vec![]).is_empty());
    }

    #[test]
    fn test_accounts_group_per_member_stats() {
        let members = vec![
            MemberInfo {
                id: "owner-1".to_string(),
                name: "Owner".to_string(),
                email: "owner@example.com".to_string(),
                title: "Owner".to_string(),
                is_active: true,
            },
            MemberInfo {
                id: "staff-1".to_string(),
                name: "Staff".to_string(),
                email: "staff@example.com".to_string(),
                title: "Staff".to_string(),
                is_active: true,
            },
        ];

        let topups = vec![
            topup("t1", "owner-1", 500, DAY1),
            topup("t2", "owner-1", 200, DAY1),
            topup("t3", "staff-1", 100, DAY2),
        ];

        let mut settled = order("o1", OrderStatus::Success, DAY1);
        settled.succeeded_by = Some("staff-1".to_string());
        settled.updated_at = DAY1;

        let report = group_accounts_by_day(&members, topups, vec![settled]);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].date, "2024-06-16");
        assert_eq!(report[1].date, "2024-06-14");

        // Every member appears on every day
        assert_eq!(report[0].members.len(), 2);

        let day1 = &report[1];
        let owner = &day1.members[0];
        assert_eq!(owner.topup_stat, TrackStat { count: 2, amount: 700 });
        assert_eq!(owner.order_stat, TrackStat { count: 0, amount: 0 });

        let staff = &day1.members[1];
        assert_eq!(staff.topup_stat, TrackStat { count: 0, amount: 0 });
        assert_eq!(staff.order_stat, TrackStat { count: 1, amount: 300 });
    }

    #[test]
    fn test_accounts_empty_tracks() {
        let report = group_accounts_by_day(&[], vec![], vec![]);
        assert!(report.is_empty());
    }
}
