//! Pure operations over one owner's task collection.
//!
//! Each function returns a new collection and leaves its input untouched.
//! Persisting the result is the caller's job (see [`crate::Kanban`]).
//! Unknown task ids are tolerated: the collection comes back unchanged.

use crate::error::ValidationError;
use crate::models::{Comment, Task, TaskId};

/// Append a new task. Returns the new collection and the next id seed.
pub fn add_task(
    tasks: &[Task],
    text: &str,
    owner_id: &str,
    next_id: TaskId,
) -> Result<(Vec<Task>, TaskId), ValidationError> {
    let task = Task::new(text, owner_id, next_id)?;
    let following = next_id
        .checked_add(1)
        .ok_or(ValidationError::TaskIdsExhausted)?;

    let mut updated = tasks.to_vec();
    updated.push(task);
    Ok((updated, following))
}

pub fn toggle_completion(tasks: &[Task], task_id: TaskId) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            if task.id == task_id {
                Task {
                    completed: !task.completed,
                    ..task.clone()
                }
            } else {
                task.clone()
            }
        })
        .collect()
}

/// Append a comment to the matching task.
///
/// Blank content is rejected before the task is looked up.
pub fn add_comment(
    tasks: &[Task],
    task_id: TaskId,
    content: &str,
    author_id: &str,
    author_name: &str,
) -> Result<Vec<Task>, ValidationError> {
    let comment = Comment::new(content, author_id, author_name)?;

    Ok(tasks
        .iter()
        .map(|task| {
            let mut task = task.clone();
            if task.id == task_id {
                task.comments.push(comment.clone());
            }
            task
        })
        .collect())
}

pub(crate) fn contains(tasks: &[Task], task_id: TaskId) -> bool {
    tasks.iter().any(|t| t.id == task_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn tasks() -> Vec<Task> {
        vec![
            Task::new("Buy milk", "u1", 1).unwrap(),
            Task::new("Call mum", "u1", 2).unwrap(),
        ]
    }

    #[rstest]
    fn add_task_appends_at_the_end(tasks: Vec<Task>) {
        let (updated, next) = add_task(&tasks, " Walk dog ", "u1", 3).unwrap();
        assert_eq!(updated.len(), 3);
        assert_eq!(updated[2].id, 3);
        assert_eq!(updated[2].text, "Walk dog");
        assert_eq!(next, 4);
        assert_eq!(tasks.len(), 2);
    }

    #[rstest]
    fn add_task_rejects_blank_text(tasks: Vec<Task>) {
        assert_eq!(
            add_task(&tasks, "   ", "u1", 3),
            Err(ValidationError::EmptyTaskText)
        );
    }

    #[rstest]
    fn add_task_refuses_to_wrap_the_id_seed(tasks: Vec<Task>) {
        assert_eq!(
            add_task(&tasks, "One too many", "u1", TaskId::MAX),
            Err(ValidationError::TaskIdsExhausted)
        );
    }

    #[rstest]
    fn toggle_twice_is_identity(tasks: Vec<Task>) {
        let once = toggle_completion(&tasks, 2);
        assert!(once[1].completed);
        assert!(!once[0].completed);

        let twice = toggle_completion(&once, 2);
        assert_eq!(twice, tasks);
    }

    #[rstest]
    fn toggle_unknown_id_changes_nothing(tasks: Vec<Task>) {
        assert_eq!(toggle_completion(&tasks, 99), tasks);
    }

    #[rstest]
    fn comments_keep_insertion_order(tasks: Vec<Task>) {
        let updated = add_comment(&tasks, 1, "first", "u1", "Alice").unwrap();
        let updated = add_comment(&updated, 1, "second", "u2", "Bob").unwrap();
        let updated = add_comment(&updated, 1, "first", "u1", "Alice").unwrap();

        let contents: Vec<_> = updated[0].comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "first"]);
        assert!(updated[1].comments.is_empty());
    }

    #[rstest]
    #[case("")]
    #[case("  ")]
    fn blank_comment_is_rejected(tasks: Vec<Task>, #[case] content: &str) {
        assert_eq!(
            add_comment(&tasks, 1, content, "u1", "Alice"),
            Err(ValidationError::EmptyComment)
        );
    }

    #[rstest]
    fn comment_on_unknown_task_changes_nothing(tasks: Vec<Task>) {
        let updated = add_comment(&tasks, 42, "hello", "u1", "Alice").unwrap();
        assert_eq!(updated, tasks);
    }
}
