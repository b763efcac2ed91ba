pub mod create_webtoon;

pub use create_webtoon::CreateWebtoonRequest;
