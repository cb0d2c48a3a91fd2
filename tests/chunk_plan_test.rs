// ABOUTME: Tests for chunk geometry of the upload pipeline
// ABOUTME: Covers coverage of all bytes, the 25 MiB example and the empty video case
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used)]

use tiktok_studio::constants::upload::RECOMMENDED_CHUNK_SIZE;
use tiktok_studio::upload::ChunkPlan;

const MIB: u64 = 1024 * 1024;

/// Every byte covered exactly once, in order
fn assert_exact_cover(plan: &ChunkPlan) {
    let mut next = 0;
    for range in plan.ranges() {
        assert_eq!(range.start, next, "gap or overlap before chunk {}", range.index);
        assert!(range.end >= range.start);
        assert!(range.len() <= plan.chunk_size);
        next = range.end + 1;
    }
    assert_eq!(next, plan.video_size);
}

#[test]
fn test_twenty_five_mib_video() {
    let plan = ChunkPlan::plan(25 * MIB);

    assert_eq!(plan.video_size, 26_214_400);
    assert_eq!(plan.chunk_size, 10 * MIB);
    assert_eq!(plan.total_chunk_count, 3);

    let ranges: Vec<String> = plan.ranges().map(|r| r.content_range()).collect();
    assert_eq!(
        ranges,
        vec![
            "bytes 0-10485759/26214400",
            "bytes 10485760-20971519/26214400",
            "bytes 20971520-26214399/26214400",
        ]
    );
    assert_exact_cover(&plan);
}

#[test]
fn test_chunk_count_matches_ceiling_for_many_sizes() {
    let sizes = [
        1,
        2,
        MIB,
        RECOMMENDED_CHUNK_SIZE - 1,
        RECOMMENDED_CHUNK_SIZE,
        RECOMMENDED_CHUNK_SIZE + 1,
        3 * RECOMMENDED_CHUNK_SIZE,
        64 * MIB + 17,
    ];
    for size in sizes {
        let plan = ChunkPlan::plan(size);
        let chunk_size = size.min(RECOMMENDED_CHUNK_SIZE);
        assert_eq!(plan.chunk_size, chunk_size, "size {size}");
        assert_eq!(plan.total_chunk_count, size.div_ceil(chunk_size), "size {size}");
        assert!(plan.total_chunk_count >= 1);
        assert_eq!(plan.ranges().count() as u64, plan.total_chunk_count);
        assert_exact_cover(&plan);
    }
}

#[test]
fn test_empty_video_means_nothing_to_upload() {
    let plan = ChunkPlan::plan(0);

    assert!(plan.is_empty());
    assert_eq!(plan.chunk_size, 0);
    assert_eq!(plan.total_chunk_count, 0);
    assert!(plan.range(0).is_none());
}

#[test]
fn test_range_past_end_is_none() {
    let plan = ChunkPlan::plan_with_chunk_size(10, 4);

    assert_eq!(plan.total_chunk_count, 3);
    let last = plan.range(2).unwrap();
    assert_eq!((last.start, last.end), (8, 9));
    assert_eq!(last.len(), 2);
    assert!(plan.range(3).is_none());
}
