use crate::error::AppError;
use crate::models::{Assignment, NewAssignmentRequest, UpdateAssignmentRequest};
use crate::store::Store;

pub async fn fetch_assignments(store: &Store) -> Result<Vec<Assignment>, AppError> {
    Ok(store.load().await?.assignments)
}

pub async fn insert_assignment(
    store: &Store,
    req: NewAssignmentRequest,
) -> Result<Assignment, AppError> {
    let title = req.title.trim().to_string();
    let course = req.course.trim().to_string();
    if title.is_empty() {
        return Err(AppError::BadRequest("title must not be empty".to_string()));
    }
    if course.is_empty() {
        return Err(AppError::BadRequest("course must not be empty".to_string()));
    }

    let assignment = Assignment::manual(title, course, req.due_date);
    let created = assignment.clone();

    store
        .update(move |doc| {
            doc.assignments.push(assignment);
            Ok(())
        })
        .await?;

    Ok(created)
}

pub async fn update_assignment(
    store: &Store,
    id: &str,
    req: UpdateAssignmentRequest,
) -> Result<Option<Assignment>, AppError> {
    store
        .update(|doc| {
            let Some(current) = doc.assignments.iter_mut().find(|a| a.id == id) else {
                return Ok(None);
            };

            if let Some(completed) = req.completed {
                current.completed = completed;
            }
            Ok(Some(current.clone()))
        })
        .await
}

pub async fn delete_assignment(store: &Store, id: &str) -> Result<bool, AppError> {
    store
        .update(|doc| {
            let before = doc.assignments.len();
            doc.assignments.retain(|a| a.id != id);
            Ok(doc.assignments.len() < before)
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup_test_store() -> (TempDir, Store) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = Store::new(dir.path().join("assignments.json"));
        (dir, store)
    }

    fn new_request(title: &str) -> NewAssignmentRequest {
        NewAssignmentRequest {
            title: title.to_string(),
            course: "Anatomy".to_string(),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_assignment() {
        let (_dir, store) = setup_test_store();

        let created = insert_assignment(&store, new_request("  Chapter 4 quiz "))
            .await
            .expect("Failed to insert assignment");
        assert_eq!(created.title, "Chapter 4 quiz");
        assert!(created.is_manual());
        assert!(!created.completed);

        let all = fetch_assignments(&store).await.expect("Failed to fetch");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, created.id);
    }

    #[tokio::test]
    async fn test_insert_rejects_blank_title() {
        let (_dir, store) = setup_test_store();

        let err = insert_assignment(&store, new_request("   "))
            .await
            .expect_err("blank title must be rejected");
        assert_eq!(err.kind(), "bad_request");
        assert!(fetch_assignments(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_completed() {
        let (_dir, store) = setup_test_store();
        let created = insert_assignment(&store, new_request("Lab")).await.unwrap();

        let updated = update_assignment(
            &store,
            &created.id,
            UpdateAssignmentRequest { completed: Some(true) },
        )
        .await
        .expect("Failed to update")
        .expect("Assignment not found");
        assert!(updated.completed);

        let reverted = update_assignment(
            &store,
            &created.id,
            UpdateAssignmentRequest { completed: Some(false) },
        )
        .await
        .unwrap()
        .unwrap();
        assert!(!reverted.completed);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let (_dir, store) = setup_test_store();

        let result = update_assignment(&store, "missing", UpdateAssignmentRequest::default())
            .await
            .expect("update should not fail");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_assignment() {
        let (_dir, store) = setup_test_store();
        let keep = insert_assignment(&store, new_request("Keep")).await.unwrap();
        let gone = insert_assignment(&store, new_request("Gone")).await.unwrap();

        assert!(delete_assignment(&store, &gone.id).await.unwrap());
        assert!(!delete_assignment(&store, &gone.id).await.unwrap());

        let all = fetch_assignments(&store).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, keep.id);
    }
}
