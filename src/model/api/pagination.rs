use rocket::{
    http::Status,
    request::{self, FromRequest, Request},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Which page of results a client wants, taken from the `page_num` and
/// `page_size` query parameters. Pages are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationRequest {
    page_num: u32,
    page_size: u32,
}

impl PaginationRequest {
    pub fn new(page_num: u32, page_size: u32) -> Option<Self> {
        (page_num >= 1 && page_size >= 1).then_some(Self {
            page_num,
            page_size,
        })
    }

    pub fn page_num(&self) -> u32 {
        self.page_num
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of items before the start of this page.
    pub fn skip(&self) -> u64 {
        u64::from(self.page_num - 1) * u64::from(self.page_size)
    }

    /// Wrap one page of items together with the pagination metadata.
    pub fn to_paginated<T>(self, total: u64, items: Vec<T>) -> Paginated<T> {
        Paginated {
            items,
            pagination: PaginationResult {
                page_num: self.page_num,
                page_size: self.page_size,
                total,
            },
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for PaginationRequest {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let page_num = match req.query_value::<u32>("page_num").unwrap_or(Ok(1)) {
            Ok(page_num) => page_num,
            Err(_) => return request::Outcome::Failure((Status::BadRequest, ())),
        };
        let page_size = match req
            .query_value::<u32>("page_size")
            .unwrap_or(Ok(DEFAULT_PAGE_SIZE))
        {
            Ok(page_size) => page_size,
            Err(_) => return request::Outcome::Failure((Status::BadRequest, ())),
        };
        match Self::new(page_num, page_size) {
            Some(pagination) => request::Outcome::Success(pagination),
            None => request::Outcome::Failure((Status::BadRequest, ())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationResult {
    pub page_num: u32,
    pub page_size: u32,
    pub total: u64,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PaginationResult,
}
