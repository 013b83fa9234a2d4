use std::cmp::Ordering;

use crate::Task;

/// Total order used by every task list: dated tasks first, earliest due date
/// first, then priority descending.
#[must_use]
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    let by_due = match (a.due_date, b.due_date) {
        (Some(a_due), Some(b_due)) => a_due.cmp(&b_due),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_due.then_with(|| b.priority.rank().cmp(&a.priority.rank()))
}

/// Return a sorted copy of `tasks`. Equal keys keep their input order.
#[must_use]
pub fn sort_tasks(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(compare_tasks);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use time::macros::datetime;

    fn task(title: &str, due: Option<OffsetDateTime>, priority: &str) -> Task {
        Task::new(title).with_due_date(due).with_priority(priority)
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.title.as_str()).collect()
    }

    #[test]
    fn dated_tasks_precede_undated_and_priority_breaks_ties() {
        let tasks = vec![
            task("A", None, "low"),
            task("B", Some(datetime!(2024-01-01 0:00 UTC)), "high"),
            task("C", Some(datetime!(2024-01-01 0:00 UTC)), "medium"),
        ];
        assert_eq!(titles(&sort_tasks(&tasks)), vec!["B", "C", "A"]);
    }

    #[test]
    fn earlier_due_date_wins_over_priority() {
        let tasks = vec![
            task("later-high", Some(datetime!(2024-03-01 0:00 UTC)), "high"),
            task("sooner-low", Some(datetime!(2024-02-01 0:00 UTC)), "low"),
        ];
        assert_eq!(titles(&sort_tasks(&tasks)), vec!["sooner-low", "later-high"]);
    }

    #[test]
    fn unrecognized_priority_ranks_after_low() {
        let tasks = vec![
            task("odd", None, "someday"),
            task("low", None, "low"),
            task("high", None, "HIGH"),
        ];
        assert_eq!(titles(&sort_tasks(&tasks)), vec!["high", "low", "odd"]);
    }

    #[test]
    fn order_is_independent_of_input_permutation() {
        let base = vec![
            task("1", Some(datetime!(2024-01-01 0:00 UTC)), "high"),
            task("2", Some(datetime!(2024-01-01 0:00 UTC)), "low"),
            task("3", Some(datetime!(2024-01-05 0:00 UTC)), "medium"),
            task("4", None, "high"),
            task("5", None, "medium"),
            task("6", None, "weird"),
        ];
        let expected = titles(&sort_tasks(&base))
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();

        let mut rotated = base.clone();
        for _ in 0..base.len() {
            rotated.rotate_left(1);
            let mut reversed = rotated.clone();
            reversed.reverse();
            for candidate in [&rotated, &reversed] {
                let sorted = sort_tasks(candidate);
                assert_eq!(titles(&sorted), expected);
            }
        }
    }

    #[test]
    fn adjacent_pairs_are_ordered() {
        let tasks = vec![
            task("x", None, "low"),
            task("y", Some(datetime!(2024-06-01 12:00 UTC)), "low"),
            task("z", Some(datetime!(2023-06-01 12:00 UTC)), "high"),
            task("w", None, "high"),
            task("v", Some(datetime!(2023-06-01 12:00 UTC)), "medium"),
        ];
        let sorted = sort_tasks(&tasks);
        for pair in sorted.windows(2) {
            assert_ne!(compare_tasks(&pair[0], &pair[1]), Ordering::Greater);
        }
    }
}
