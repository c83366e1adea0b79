use crate::domain::model::{ChapterCount, StatRow, Statistics};
use std::collections::HashMap;

/// 章節標籤慣例為 "NN - 描述"，桶鍵取第一個 " - " 之前的片段；
/// 沒有分隔符時整個標籤就是桶鍵
pub fn chapter_bucket(label: &str) -> &str {
    label.split(" - ").next().unwrap_or(label).trim()
}

/// 對 (confidence, is_dual_use, chapter) 投影做本地聚合。
/// 全表掃描，只適合小目錄規模。
pub fn aggregate(rows: &[StatRow]) -> Statistics {
    let total = rows.len() as u64;
    let dual_use_count = rows.iter().filter(|r| r.is_dual_use).count() as u64;

    let average_confidence = if rows.is_empty() {
        0
    } else {
        let sum: u64 = rows.iter().map(|r| r.confidence as u64).sum();
        (sum as f64 / rows.len() as f64).round() as u32
    };

    let mut buckets: HashMap<String, u64> = HashMap::new();
    for row in rows {
        *buckets
            .entry(chapter_bucket(&row.chapter).to_string())
            .or_insert(0) += 1;
    }

    let mut top_chapters: Vec<ChapterCount> = buckets
        .into_iter()
        .map(|(chapter, count)| ChapterCount { chapter, count })
        .collect();
    // 次數相同時以桶鍵排序，結果才穩定
    top_chapters.sort_by(|a, b| b.count.cmp(&a.count).then(a.chapter.cmp(&b.chapter)));
    top_chapters.truncate(5);

    Statistics {
        total,
        dual_use_count,
        average_confidence,
        top_chapters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(confidence: u8, is_dual_use: bool, chapter: &str) -> StatRow {
        StatRow {
            confidence,
            is_dual_use,
            chapter: chapter.to_string(),
        }
    }

    #[test]
    fn test_chapter_bucket() {
        assert_eq!(chapter_bucket("84 - Machines"), "84");
        assert_eq!(chapter_bucket("85 - Electrical - misc"), "85");
        assert_eq!(chapter_bucket("no separator"), "no separator");
    }

    #[test]
    fn test_aggregate_reference_scenario() {
        let rows = vec![
            row(80, false, "84 - Machines"),
            row(90, true, "84 - Machines"),
            row(100, false, "85 - Electrical"),
        ];

        let stats = aggregate(&rows);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.dual_use_count, 1);
        assert_eq!(stats.average_confidence, 90);
        assert_eq!(stats.top_chapters[0].chapter, "84");
        assert_eq!(stats.top_chapters[0].count, 2);
        assert_eq!(stats.top_chapters[1].chapter, "85");
        assert_eq!(stats.top_chapters[1].count, 1);
    }

    #[test]
    fn test_aggregate_empty() {
        let stats = aggregate(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.dual_use_count, 0);
        assert_eq!(stats.average_confidence, 0);
        assert!(stats.top_chapters.is_empty());
    }

    #[test]
    fn test_aggregate_keeps_top_five_buckets() {
        let mut rows = Vec::new();
        for chapter in ["01", "02", "03", "04", "05", "06", "07"] {
            rows.push(row(80, false, &format!("{} - something", chapter)));
        }
        // 讓 07 變成最大桶
        rows.push(row(80, false, "07 - something"));

        let stats = aggregate(&rows);
        assert_eq!(stats.top_chapters.len(), 5);
        assert_eq!(stats.top_chapters[0].chapter, "07");
        assert_eq!(stats.top_chapters[0].count, 2);
    }

    #[test]
    fn test_average_rounding() {
        let rows = vec![row(80, false, "84 - A"), row(81, false, "84 - A")];
        // 80.5 四捨五入到 81
        assert_eq!(aggregate(&rows).average_confidence, 81);
    }
}
