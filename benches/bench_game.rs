use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use complot_rs::{Game, PlayerAgent, RandomAgent};

fn complete_game(num_players: usize) {
    let mut rng = Pcg64Mcg::seed_from_u64(num_players as u64);
    let agents: Vec<Box<dyn PlayerAgent>> = (0..num_players)
        .map(|seat| Box::new(RandomAgent::new(seat as u64)) as Box<dyn PlayerAgent>)
        .collect();

    let mut game = black_box(Game::new(agents).unwrap());
    game.deal_initial_hands(&mut rng).unwrap();

    for _ in 0..1000 {
        if game.is_game_over() {
            break;
        }
        let _ = game.play_turn(&mut rng);
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("complete_game");
    for num_players in 3..=6usize {
        group.bench_with_input(BenchmarkId::from_parameter(num_players), &num_players, |b, &num_players| {
            b.iter(|| complete_game(num_players))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
