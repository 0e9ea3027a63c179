use tracing::info;

use super::model::NewMemorial;
use super::repo::MemorialRepo;

const DEMO_RECORDS: [(&str, &str, &str); 5] = [
    ("太祖", "韩晨超", "创始人，奠定基石"),
    ("高宗", "邵涧泽", "继任者，开疆拓土"),
    ("太宗", "韩天昂", "中兴之主，再创辉煌"),
    ("仁宗", "李嘉俊", "仁德之君，惠及众人"),
    ("宪宗", "张硕航", "制度建设，规范发展"),
];

/// Inserts the demo records into an empty store. Returns how many were inserted.
pub async fn seed_if_empty(repo: &dyn MemorialRepo) -> anyhow::Result<usize> {
    if repo.count().await? > 0 {
        info!("store already contains memorials, skipping seed");
        return Ok(0);
    }

    for (title, name, description) in DEMO_RECORDS {
        repo.create(NewMemorial {
            title: title.into(),
            name: name.into(),
            description: description.into(),
            deed: None,
            tags: Vec::new(),
        })
        .await?;
    }
    info!(count = DEMO_RECORDS.len(), "seeded demo memorials");
    Ok(DEMO_RECORDS.len())
}
