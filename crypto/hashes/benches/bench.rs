use bitscript_hashes::{Hasher, HasherBase, TransactionHash, hash160};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::{RngCore, thread_rng};

fn bench_transaction_hash(c: &mut Criterion) {
    let mut data = vec![0u8; 250];
    thread_rng().fill_bytes(&mut data);
    c.bench_function("TransactionHash 250 bytes", |b| {
        b.iter(|| {
            let mut hasher = TransactionHash::new();
            hasher.update(black_box(&data));
            hasher.finalize()
        })
    });
}

fn bench_hash160(c: &mut Criterion) {
    let mut key = [0u8; 33];
    thread_rng().fill_bytes(&mut key);
    c.bench_function("hash160 pubkey", |b| b.iter(|| hash160(black_box(&key))));
}

criterion_group!(benches, bench_transaction_hash, bench_hash160);
criterion_main!(benches);
