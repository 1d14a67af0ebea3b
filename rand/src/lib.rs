/// 随机字节源, 所有需要随机性的运算都通过`&mut`借用同一个实例
pub trait Rand {
    fn rand(&mut self, random: &mut [u8]);
}

mod seeded_rand;
pub use seeded_rand::SeededRand;
