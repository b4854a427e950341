use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{Task, TaskCreate, TaskQuery, TaskUpdate},
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use sqlx::{PgConnection, PgPool};
use validator::Validate;

const TASK_COLUMNS: &str = "id, user_id, title, description, completed, created_at, updated_at";

/// Retrieves the authenticated user's tasks, newest first.
///
/// ## Query Parameters:
/// - `completed` (optional): only return tasks with this completion state.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    query_params: web::Query<TaskQuery>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;

    let mut sql = format!("SELECT {} FROM tasks WHERE user_id = $1", TASK_COLUMNS);
    if query_params.completed.is_some() {
        sql.push_str(" AND completed = $2");
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(&current_user.id);
    if let Some(completed) = query_params.completed {
        query_builder = query_builder.bind(completed);
    }

    let tasks = query_builder.fetch_all(&mut *conn).await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: 1 to 200 characters (required).
/// - `description` (optional): at most 1000 characters.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `401 Unauthorized`: missing or invalid token.
/// - `422 Unprocessable Entity`: validation failed.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<TaskCreate>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), &current_user.id);

    let mut conn = pool.acquire().await?;
    sqlx::query(
        "INSERT INTO tasks (id, user_id, title, description, completed, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(&task.id)
    .bind(&task.user_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.completed)
    .bind(task.created_at)
    .bind(task.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one of the authenticated user's tasks.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `404 Not Found`: no such task, or it belongs to someone else.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<String>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let task = fetch_owned_task(&mut conn, &task_id, &current_user.id).await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Updates a task. Fields left out of the body keep their current value.
///
/// ## Request Body:
/// - `title` (optional): 1 to 200 characters.
/// - `description` (optional): at most 1000 characters.
/// - `completed` (optional): new completion state.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `404 Not Found`: no such task, or it belongs to someone else.
/// - `422 Unprocessable Entity`: validation failed.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<String>,
    task_data: web::Json<TaskUpdate>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let mut conn = pool.acquire().await?;
    let mut task = fetch_owned_task(&mut conn, &task_id, &current_user.id).await?;
    task.apply(task_data.into_inner());
    save_task(&mut conn, &task).await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Flips a task between open and completed.
#[patch("/{id}/complete")]
pub async fn toggle_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<String>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;
    let mut task = fetch_owned_task(&mut conn, &task_id, &current_user.id).await?;
    task.toggle_completed();
    save_task(&mut conn, &task).await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `404 Not Found`: no such task, or it belongs to someone else.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<String>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let mut conn = pool.acquire().await?;

    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id.as_str())
        .bind(&current_user.id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(task_not_found());
    }

    Ok(HttpResponse::NoContent().finish())
}

async fn fetch_owned_task(
    conn: &mut PgConnection,
    task_id: &str,
    user_id: &str,
) -> Result<Task, AppError> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
        TASK_COLUMNS
    ))
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(task_not_found)
}

async fn save_task(conn: &mut PgConnection, task: &Task) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE tasks
         SET title = $1, description = $2, completed = $3, updated_at = $4
         WHERE id = $5 AND user_id = $6",
    )
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.completed)
    .bind(task.updated_at)
    .bind(&task.id)
    .bind(&task.user_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}
