//! Post repository.

use mh_core::entities::Post;
use mh_core::identity::Actor;
use mh_core::ids::PostId;
use mh_core::requests::UpdatePostRequest;
use mh_core::values::PostName;
use tokio_util::sync::CancellationToken;

use crate::error::DatabaseError;
use crate::service::MhService;
use crate::tracking::ChangeTracker;

pub(crate) fn row_to_post(row: &libsql::Row) -> Result<Post, DatabaseError> {
    Ok(Post {
        id: Some(PostId(row.get::<i64>(0)?)),
        name: row.get::<String>(1)?,
        area: row.get::<f64>(2)?,
    })
}

impl MhService {
    /// # Errors
    ///
    /// `Validation` for an overlong name, `AlreadyExists` if the name is taken.
    pub async fn create_post(
        &self,
        name: &str,
        area: f64,
        actor: &Actor,
        cancel: &CancellationToken,
    ) -> Result<Post, DatabaseError> {
        let name = PostName::new(name)?;
        if self.find_post_by_name(name.as_str()).await?.is_some() {
            return Err(DatabaseError::already_exists("Post", name.as_str()));
        }

        let mut uow = ChangeTracker::new();
        let entry = uow.add(Post::new(name, area));
        self.save_changes(&mut uow, actor, cancel).await?;

        uow.entity::<Post>(entry)
            .cloned()
            .ok_or_else(|| DatabaseError::InvalidState("saved post missing from tracker".into()))
    }

    /// # Errors
    ///
    /// `NotFound` if the post does not exist, `AlreadyExists` if the new name
    /// belongs to another post.
    pub async fn update_post(
        &self,
        request: UpdatePostRequest,
        actor: &Actor,
        cancel: &CancellationToken,
    ) -> Result<Post, DatabaseError> {
        let name = PostName::new(&request.name)?;
        let post = self.get_post(request.id).await?;
        if let Some(other) = self.find_post_by_name(name.as_str()).await? {
            if other.id != post.id {
                return Err(DatabaseError::already_exists("Post", name.as_str()));
            }
        }

        let mut uow = ChangeTracker::new();
        let entry = uow.attach(post);
        let post = uow
            .entity_mut::<Post>(entry)
            .ok_or_else(|| DatabaseError::InvalidState("attached post missing".into()))?;
        post.rename(name);
        post.change_area(request.area);
        self.save_changes(&mut uow, actor, cancel).await?;

        self.get_post(request.id).await
    }

    /// Delete a post; its house links are removed by the database.
    ///
    /// # Errors
    ///
    /// `NotFound` if the post does not exist.
    pub async fn delete_post(
        &self,
        id: PostId,
        actor: &Actor,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        let post = self.get_post(id).await?;
        let mut uow = ChangeTracker::new();
        let entry = uow.attach(post);
        uow.remove(entry)?;
        self.save_changes(&mut uow, actor, cancel).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// `NotFound` if the post does not exist.
    pub async fn get_post(&self, id: PostId) -> Result<Post, DatabaseError> {
        let mut rows = self
            .db()
            .query("SELECT id, name, area FROM posts WHERE id = ?1", [id.value()])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("Post", id))?;
        row_to_post(&row)
    }

    pub async fn find_post_by_name(&self, name: &str) -> Result<Option<Post>, DatabaseError> {
        let mut rows = self
            .db()
            .query("SELECT id, name, area FROM posts WHERE name = ?1", [name])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_post(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, DatabaseError> {
        let mut rows = self
            .db()
            .query("SELECT id, name, area FROM posts ORDER BY name", ())
            .await?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next().await? {
            posts.push(row_to_post(&row)?);
        }
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn create_assigns_generated_key() {
        let svc = test_service().await;
        let post = svc
            .create_post(" North ", -3.0, &Actor::system(), &CancellationToken::new())
            .await
            .unwrap();
        let id = post.id.unwrap();
        assert_eq!(post.name, "North");
        assert!(post.area.abs() < f64::EPSILON);
        assert_eq!(svc.get_post(id).await.unwrap(), post);
    }

    #[tokio::test]
    async fn names_are_unique() {
        let svc = test_service().await;
        let cancel = CancellationToken::new();
        svc.create_post("North", 1.0, &Actor::system(), &cancel)
            .await
            .unwrap();
        let south = svc
            .create_post("South", 1.0, &Actor::system(), &cancel)
            .await
            .unwrap();

        let err = svc
            .create_post("North", 2.0, &Actor::system(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::AlreadyExists { .. }));

        let err = svc
            .update_post(
                UpdatePostRequest {
                    id: south.id.unwrap(),
                    name: "North".into(),
                    area: 1.0,
                },
                &Actor::system(),
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let svc = test_service().await;
        let cancel = CancellationToken::new();
        let post = svc
            .create_post("North", 1.0, &Actor::system(), &cancel)
            .await
            .unwrap();
        let id = post.id.unwrap();

        let updated = svc
            .update_post(
                UpdatePostRequest {
                    id,
                    name: "North".into(),
                    area: 7.5,
                },
                &Actor::system(),
                &cancel,
            )
            .await
            .unwrap();
        assert!((updated.area - 7.5).abs() < f64::EPSILON);

        svc.delete_post(id, &Actor::system(), &cancel).await.unwrap();
        assert!(matches!(
            svc.get_post(id).await,
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(svc.list_posts().await.unwrap().is_empty());
    }
}
