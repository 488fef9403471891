use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use evasao_core::schema::*;
use evasao_core::{
    ImputationProfile, InferenceContext, Node, OneHotEncoder, RandomForest, RawRecord, Tree,
};

const RECORD_COUNT: usize = 256;
const UFS: [&str; 6] = ["SP", "RJ", "MG", "BA", "RS", "PE"];
const SEXOS: [&str; 2] = ["Feminino", "Masculino"];
const OFERTAS: [&str; 3] = ["Regular", "PRONATEC", "PROEJA - Integrado"];

fn build_encoder() -> OneHotEncoder {
    let rows: Vec<Vec<Option<String>>> = (0..60)
        .map(|idx| {
            vec![
                Some(((idx % 3) + 1).to_string()),
                Some(if idx % 2 == 0 { "Público" } else { "Privado" }.to_string()),
                Some(if idx % 4 == 0 { "EAD" } else { "Presencial" }.to_string()),
                Some(SEXOS[idx % 2].to_string()),
                Some(if idx % 5 == 0 { "FIC" } else { "Técnico" }.to_string()),
                Some(OFERTAS[idx % 3].to_string()),
                Some(UFS[idx % UFS.len()].to_string()),
                Some(format!("Eixo {}", idx % 12)),
                Some(format!("Subeixo {}", idx % 20)),
            ]
        })
        .collect();
    OneHotEncoder::fit(&CATEGORICAL_FEATURES, &rows).expect("encoder fit")
}

fn build_context() -> InferenceContext {
    let encoder = build_encoder();
    let n_features = NUMERIC_FEATURES.len() + encoder.n_features_out();
    let trees = (0..100)
        .map(|idx| {
            Tree::new(vec![
                Node::internal(0, (idx % n_features) as i32, 0.5, 1, 2),
                Node::internal(1, 0, 800.0, 3, 4),
                Node::leaf(2, 0.7),
                Node::leaf(3, 0.1),
                Node::leaf(4, 0.4),
            ])
        })
        .collect();
    InferenceContext::from_parts(
        Box::new(RandomForest::new(n_features, trees)),
        encoder,
        ImputationProfile::frozen(),
    )
    .expect("context")
}

fn generate_records(count: usize) -> Vec<RawRecord> {
    (0..count)
        .map(|idx| {
            RawRecord::new()
                .with(CARGA_HORARIA, 400 + (idx as i64 * 37 % 1200))
                .with(FATOR_ESFORCO_CURSO, ((idx % 3) + 1).to_string())
                .with(FONTE_FINANCIAMENTO, "PÃºblico")
                .with(MODALIDADE_ENSINO, "Presencial")
                .with(SEXO, SEXOS[idx % 2])
                .with(TIPO_CURSO, "TÃ©cnico")
                .with(TIPO_OFERTA, OFERTAS[idx % 3])
                .with(UF, UFS[idx % UFS.len()])
                .with(NUMERO_REGISTROS, (idx % 7) as i64)
                .with(CODIGO_UNIDADE_SISTEC, 10_000 + idx as i64)
        })
        .collect()
}

fn benchmark_alignment(c: &mut Criterion) {
    let context = build_context();
    let records = generate_records(RECORD_COUNT);

    let mut group = c.benchmark_group("evasao_inference");
    group.throughput(Throughput::Elements(RECORD_COUNT as u64));
    group.bench_function("align_256_records", |b| {
        b.iter(|| {
            for record in &records {
                criterion::black_box(context.align(record).expect("align"));
            }
        });
    });
    group.bench_function("predict_256_records", |b| {
        b.iter(|| {
            for record in &records {
                criterion::black_box(context.predict(record).expect("predict"));
            }
        });
    });
    group.finish();
}

criterion_group!(benches, benchmark_alignment);
criterion_main!(benches);
