use blockdoc_config::ViewportConfig;
use blockdoc_engine::model::BlockModel;
use blockdoc_engine::parsing::{BlockDescriptor, fallback};
use blockdoc_engine::{Block, BlockId, BlockKind, VirtualViewport};
use criterion::{Criterion, criterion_group, criterion_main};
mod common;

fn blocks(content: &str) -> BlockModel {
    let blocks = fallback::split(content)
        .into_iter()
        .map(|d: BlockDescriptor| Block {
            id: BlockId::derived(BlockKind::from_type_str(&d.kind), d.from),
            kind: BlockKind::from_type_str(&d.kind),
            span: d.span(),
            content: content[d.from..d.to].to_string(),
            meta: d.meta,
        })
        .collect();
    BlockModel::new(blocks)
}

fn bench_viewport(c: &mut Criterion) {
    let mut group = c.benchmark_group("viewport");
    group.sample_size(10);

    let content = common::generate_markdown_content(1000);
    let model = blocks(&content);
    let mut viewport = VirtualViewport::new(ViewportConfig::default());

    group.bench_function("layout", |b| {
        b.iter(|| {
            viewport.layout(std::hint::black_box(model.blocks()));
        });
    });

    viewport.layout(model.blocks());
    let middle = viewport.total_height() / 2.0;

    group.bench_function("visible_window", |b| {
        b.iter(|| {
            let window = viewport.visible_window(std::hint::black_box(middle), 800.0);
            std::hint::black_box(window);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_viewport);
criterion_main!(benches);
