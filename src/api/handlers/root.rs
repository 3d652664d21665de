/*
 * Responsibility
 * - GET / (疎通用 greeting)
 */

pub async fn root() -> &'static str {
    "Hello Mommy!"
}
